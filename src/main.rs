//! Titanic Survival Prediction Service - Main Entry Point
//!
//! Loads the three survival models and serves predictions over HTTP.

use anyhow::Result;
use std::sync::Arc;
use titanic_survival_api::{
    config::{AppConfig, LogFormat},
    metrics::{MetricsReporter, ServiceMetrics},
    models::ModelLoader,
    server::{self, AppState},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info")
            .add_directive(format!("titanic_survival_api={}", config.logging.level).parse()?),
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log level and format come from configuration
    let config = AppConfig::load()?;
    init_logging(&config)?;

    info!("Starting Titanic Survival Prediction Service");
    info!(
        models_dir = %config.models.models_dir,
        allow_origin = ?config.cors.allow_origin,
        "Configuration loaded successfully"
    );

    // Every model must load before serving
    let loader = ModelLoader::with_threads(config.models.onnx_threads)?;
    let models = loader.load_model_set(&config.models)?;

    let metrics = Arc::new(ServiceMetrics::new());
    let state = Arc::new(AppState::with_metrics(models, metrics.clone()));
    info!(
        "Inference engine initialized with {} models: {:?}",
        state.engine.model_count(),
        state.engine.model_names()
    );

    if config.metrics.report_interval_secs > 0 {
        let reporter = MetricsReporter::new(metrics.clone(), config.metrics.report_interval_secs);
        tokio::spawn(reporter.start());
    }

    server::serve(&config, state, shutdown_signal()).await?;

    info!("Prediction service shutting down...");
    metrics.print_summary();

    Ok(())
}
