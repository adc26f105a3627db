pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod table;
pub mod telemetry;

use std::sync::Arc;
use config::{Config, ExtractorConfig};
use error::{AppError, Result};
use extractor::{Extractor, HtmlExtractor, RemoteExtractor, SubprocessExtractor};
use gate::ScrapeGate;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gate: Arc<ScrapeGate>,
}

impl AppState {
    pub fn new(config: Config, extractor: Arc<dyn Extractor>) -> Self {
        let gate = ScrapeGate::new(extractor, config.scrape_timeout);
        Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
        }
    }

    /// Builds the extractor the configuration asks for.
    pub fn from_config(config: Config) -> Result<Self> {
        let extractor: Arc<dyn Extractor> = match &config.extractor {
            ExtractorConfig::InProcess => {
                let html = HtmlExtractor::new(config.fetch_timeout).map_err(|e| {
                    AppError::ConfigError(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(html)
            }
            ExtractorConfig::Subprocess { program, args, output } => Arc::new(
                SubprocessExtractor::new(program.clone(), args.clone(), output.clone()),
            ),
            ExtractorConfig::Remote { endpoint } => {
                let remote = RemoteExtractor::new(endpoint.clone(), config.scrape_timeout).map_err(|e| {
                    AppError::ConfigError(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(remote)
            }
        };
        Ok(Self::new(config, extractor))
    }
}
