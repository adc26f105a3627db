use axum::{
    routing::{get, post},
    Router,
    extract::{rejection::JsonRejection, Json, State},
    http::Method,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::models::ScrapeRequest;
use crate::api::response;
use crate::config::AllowedOrigins;
use crate::error::AppError;
use crate::gate::HealthStatus;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);

    // CORS only covers the routes added before it
    Router::new()
        .route("/scrape", post(scrape_handler))
        .layer(cors)
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let allow_origin = match origins {
        AllowedOrigins::Any => AllowOrigin::from(Any),
        AllowedOrigins::List(list) => AllowOrigin::list(list.iter().cloned()),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.gate.health_check())
}

async fn scrape_handler(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::info!(outcome = "rejected", reason = %rejection.body_text(), "Unreadable scrape request");
            return AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
                .into_response();
        }
    };

    match state.gate.scrape(req).await {
        Ok(document) => response::csv(document),
        Err(err) => err.into_response(),
    }
}
