//! API route definitions

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::CorsConfig;

use super::{handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Predictions are served at POST /Prediction.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed.",
        })),
    )
}

/// Cross-origin policy: the configured origin only, any method and header.
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.allow_origin.as_deref() {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {:?}", origin))?;
            Ok(cors.allow_origin(origin))
        }
        None => {
            warn!("ALLOW_ORIGIN is not set; cross-origin requests will be refused");
            Ok(cors)
        }
    }
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>, cors: &CorsConfig) -> Result<Router> {
    let app = Router::new()
        .route("/Prediction", post(handlers::predict))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors_layer(cors)?)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
