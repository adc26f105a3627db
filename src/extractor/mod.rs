//! Extractors turn one page URL into the company listings found on it.

pub mod html;
pub mod remote;
pub mod subprocess;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

pub use html::HtmlExtractor;
pub use remote::RemoteExtractor;
pub use subprocess::{OutputMode, SubprocessExtractor};

/// A company name and the URL it links to, as found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub url: String,
}

impl CompanyRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Finds company listings on a single page.
///
/// Records come back in page order. An empty vector means the extractor ran
/// but found nothing; callers decide whether that is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Vec<CompanyRecord>, ExtractError>;
}

/// HTTP client shared by the extractors that talk to the network.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ExtractError> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("vc-portfolio-scraper/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
