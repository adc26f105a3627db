use tokio::net::TcpListener;
use vc_portfolio_scraper::{
    config::Config,
    api::routes::create_router,
    telemetry,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;
    telemetry::init();

    let server_addr = config.server_addr;
    tracing::info!(
        addr = %server_addr,
        extractor = ?config.extractor,
        timeout_secs = config.scrape_timeout.as_secs(),
        "Starting server"
    );

    // Create application state
    let app_state = AppState::from_config(config)?;

    // Build the router with routes
    let app = create_router(app_state);

    // Create the listener
    let listener = TcpListener::bind(server_addr).await?;

    // Start the server
    tracing::info!("Listening on http://{}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
