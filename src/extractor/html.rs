use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ExtractError;
use crate::extractor::{http_client, CompanyRecord, Extractor};

// Create static selectors to avoid recompiling them each time
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").expect("Failed to parse anchor selector")
});

static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("img[alt]").expect("Failed to parse image selector")
});

/// Hosts that show up in page chrome rather than in a portfolio listing.
const SKIPPED_HOSTS: &[&str] = &[
    "twitter.com",
    "x.com",
    "linkedin.com",
    "facebook.com",
    "instagram.com",
    "youtube.com",
    "medium.com",
    "github.com",
    "google.com",
    "apple.com",
];

/// In-process extractor: fetches the page over HTTP and reads external links
/// out of the markup.
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new(fetch_timeout: Duration) -> Result<Self, ExtractError> {
        Ok(Self {
            client: http_client(fetch_timeout)?,
        })
    }

    /// Returns the page body and the final URL after redirects.
    pub async fn fetch_html(&self, url: &Url) -> Result<(String, Url), ExtractError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let final_url = response.url().clone();
        let html = response.text().await?;
        Ok((html, final_url))
    }
}

#[async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(&self, url: &str) -> Result<Vec<CompanyRecord>, ExtractError> {
        let page_url = Url::parse(url).map_err(|e| ExtractError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(page_url.scheme(), "http" | "https") {
            return Err(ExtractError::InvalidUrl(format!("unsupported scheme in {url}")));
        }

        let (html, final_url) = self.fetch_html(&page_url).await?;
        tracing::debug!(url = %final_url, bytes = html.len(), "fetched page");

        Ok(extract_companies(&html, &final_url))
    }
}

/// Collects one record per external link with a usable name, in document
/// order, keeping only the first occurrence of each URL.
pub fn extract_companies(html: &str, page_url: &Url) -> Vec<CompanyRecord> {
    let document = Html::parse_document(html);
    let page_host = page_url.host_str().map(bare_host);

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(target) = resolve_link(page_url, href) else {
            continue;
        };
        let Some(host) = target.host_str().map(bare_host) else {
            continue;
        };
        if Some(host) == page_host || is_skipped_host(host) {
            continue;
        }
        let Some(name) = anchor_name(&anchor) else {
            continue;
        };

        let target = target.to_string();
        if seen.insert(target.clone()) {
            records.push(CompanyRecord::new(name, target));
        }
    }

    records
}

fn resolve_link(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut target = page_url.join(href).ok()?;
    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    target.set_fragment(None);
    Some(target)
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_skipped_host(host: &str) -> bool {
    SKIPPED_HOSTS
        .iter()
        .any(|skipped| host == *skipped || host.ends_with(&format!(".{skipped}")))
}

fn anchor_name(anchor: &ElementRef<'_>) -> Option<String> {
    let text = collapse_whitespace(&anchor.text().collect::<String>());
    if !text.is_empty() {
        return Some(text);
    }

    let element = anchor.value();
    element
        .attr("title")
        .or_else(|| element.attr("aria-label"))
        .or_else(|| {
            anchor
                .select(&IMAGE_SELECTOR)
                .find_map(|img| img.value().attr("alt"))
        })
        .map(collapse_whitespace)
        .filter(|name| !name.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
