use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Failures raised while an extractor runs.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to fetch page: {0}")]
    Fetch(String),

    #[error("invalid page URL: {0}")]
    InvalidUrl(String),

    #[error("failed to start extractor process: {0}")]
    Spawn(#[source] std::io::Error),

    // stderr stays out of the message so it never reaches a client
    #[error("extractor process exited with {status}")]
    ProcessFailed { status: ExitStatus, stderr: String },

    // the upstream body is logged, not shown to the client
    #[error("remote scraper responded with status {status}")]
    RemoteFailed { status: u16, body: String },

    #[error("extractor produced no output file at {}", .path.display())]
    OutputMissing { path: PathBuf },

    #[error("extractor output is not valid CSV: {0}")]
    MalformedOutput(#[from] csv::Error),

    #[error("scratch directory error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Full diagnostic for server-side logs.
    pub fn detail(&self) -> String {
        match self {
            ExtractError::ProcessFailed { status, stderr } => {
                format!("extractor process exited with {}: {}", status, stderr.trim())
            }
            ExtractError::RemoteFailed { status, body } => {
                format!("remote scraper responded with status {}: {}", status, body.trim())
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Fetch(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("No data was scraped")]
    NoData,

    #[error("Server error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Scraping timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to build CSV: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::NoData
            | AppError::Extraction(_)
            | AppError::Export(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            // missing output is reported to callers the same way as an empty result
            AppError::Extraction(ExtractError::OutputMissing { .. }) => {
                AppError::NoData.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
