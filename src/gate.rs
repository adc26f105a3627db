//! Request gate: validates scrape requests, runs the extractor, and turns
//! every outcome into either a CSV document or an [`AppError`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::api::models::ScrapeRequest;
use crate::error::{AppError, ExtractError, Result};
use crate::extractor::Extractor;
use crate::table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// CSV text ready to send, plus the number of data rows in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDocument {
    pub body: String,
    pub rows: usize,
}

pub struct ScrapeGate {
    extractor: Arc<dyn Extractor>,
    timeout: Duration,
}

impl ScrapeGate {
    pub fn new(extractor: Arc<dyn Extractor>, timeout: Duration) -> Self {
        Self { extractor, timeout }
    }

    pub fn health_check(&self) -> HealthStatus {
        HealthStatus { status: "healthy" }
    }

    pub async fn scrape(&self, request: ScrapeRequest) -> Result<CsvDocument> {
        tracing::info!(url = ?request.url, "Received scrape request");

        let url = match request.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                tracing::info!(outcome = "rejected", "Scrape request has no URL");
                return Err(AppError::Validation("URL is required".to_string()));
            }
        };

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.extractor.extract(&url)).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let records = match result {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                log_extract_failure(&url, &err, elapsed_ms);
                return Err(AppError::Extraction(err));
            }
            Err(_) => {
                tracing::error!(
                    url = %url,
                    outcome = "timed_out",
                    elapsed_ms,
                    timeout_secs = self.timeout.as_secs(),
                    "Extractor did not finish in time"
                );
                return Err(AppError::Timeout(self.timeout));
            }
        };

        if records.is_empty() {
            tracing::error!(url = %url, outcome = "empty_result", elapsed_ms, "No companies were found");
            return Err(AppError::NoData);
        }

        let body = table::write_csv(&records).map_err(|e| {
            tracing::error!(url = %url, outcome = "failed", error = %e, "Failed to serialize CSV");
            AppError::Export(e.to_string())
        })?;

        tracing::info!(
            url = %url,
            outcome = "succeeded",
            records = records.len(),
            elapsed_ms,
            "Successfully scraped {} companies",
            records.len()
        );

        Ok(CsvDocument {
            body,
            rows: records.len(),
        })
    }
}

fn log_extract_failure(url: &str, err: &ExtractError, elapsed_ms: u64) {
    match err {
        ExtractError::OutputMissing { path } => tracing::error!(
            url = %url,
            outcome = "output_missing",
            path = %path.display(),
            elapsed_ms,
            "Extractor exited cleanly but wrote no output"
        ),
        ExtractError::ProcessFailed { status, stderr } => tracing::error!(
            url = %url,
            outcome = "failed",
            status = %status,
            stderr = %stderr.trim(),
            elapsed_ms,
            "Extractor process failed"
        ),
        other => tracing::error!(
            url = %url,
            outcome = "failed",
            error = %other.detail(),
            elapsed_ms,
            "Extraction failed"
        ),
    }
}
