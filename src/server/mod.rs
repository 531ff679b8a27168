//! HTTP front end for the survival prediction service.
//!
//! Exposes `POST /Prediction` plus health and statistics endpoints.

mod api;
mod error;
mod handlers;
mod state;

pub use api::{cors_layer, create_router};
pub use error::ApiError;
pub use state::AppState;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn serve<F>(config: &AppConfig, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, &config.cors)?;

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Listening for prediction requests");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}
