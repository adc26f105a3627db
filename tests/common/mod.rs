#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use vc_portfolio_scraper::{
    api::routes::create_router,
    config::Config,
    error::ExtractError,
    extractor::{CompanyRecord, Extractor},
    AppState,
};

type Respond = dyn Fn(&str) -> Result<Vec<CompanyRecord>, ExtractError> + Send + Sync;

/// Extractor double that answers with a canned result and counts calls.
pub struct StubExtractor {
    respond: Box<Respond>,
    calls: AtomicUsize,
}

impl StubExtractor {
    pub fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<Vec<CompanyRecord>, ExtractError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn returning(records: Vec<CompanyRecord>) -> Arc<Self> {
        Self::new(move |_| Ok(records.clone()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, url: &str) -> Result<Vec<CompanyRecord>, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(url)
    }
}

pub fn test_config() -> Config {
    Config::from_vars(|_| None).unwrap()
}

pub fn create_test_server(extractor: Arc<StubExtractor>) -> TestServer {
    let state = AppState::new(test_config(), extractor);
    TestServer::new(create_router(state)).unwrap()
}

pub fn record(name: &str, url: &str) -> CompanyRecord {
    CompanyRecord::new(name, url)
}
