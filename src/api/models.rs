use serde::Deserialize;

/// Body of `POST /scrape`. A missing `url` is reported by the gate rather
/// than by deserialization so the caller gets the usual error message.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}
