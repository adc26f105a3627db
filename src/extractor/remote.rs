use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::error::ExtractError;
use crate::extractor::{http_client, CompanyRecord, Extractor};
use crate::table;

#[derive(Serialize)]
struct RemoteScrapeRequest<'a> {
    url: &'a str,
}

/// Forwards the page URL to another scrape service speaking the same
/// `POST /scrape` contract and reads its CSV reply.
pub struct RemoteExtractor {
    client: Client,
    endpoint: Url,
}

impl RemoteExtractor {
    /// `endpoint` is the full `/scrape` URL of the upstream service.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, ExtractError> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Extractor for RemoteExtractor {
    async fn extract(&self, url: &str) -> Result<Vec<CompanyRecord>, ExtractError> {
        tracing::debug!(endpoint = %self.endpoint, "forwarding scrape request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RemoteScrapeRequest { url })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ExtractError::RemoteFailed {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(table::read_csv(body.as_ref())?)
    }
}
