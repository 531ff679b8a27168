//! Request handlers

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics::MetricsSnapshot;
use crate::types::{PredictionInput, PredictionResult};

use super::error::Result;
use super::state::AppState;

/// `POST /Prediction`: validate, normalize, run all three models.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PredictionInput>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let Json(input) = payload.map_err(|rejection| {
        state.metrics.record_rejection();
        debug!(%request_id, reason = %rejection.body_text(), "Rejected prediction request");
        rejection
    })?;

    // Session runs are synchronous and serialized per model
    let worker = state.clone();
    let (features, result) = tokio::task::spawn_blocking(move || {
        let features = worker.normalizer.normalize(input);
        let result = worker.engine.predict(&features)?;
        anyhow::Ok((features, result))
    })
    .await
    .context("Inference task aborted")
    .and_then(|outcome| outcome)
    .map_err(|e| {
        state.metrics.record_failure();
        e
    })?;

    let elapsed = start.elapsed();
    state.metrics.record_prediction(elapsed, &result);

    info!(
        %request_id,
        title = %features.title(),
        logistic_regression = result.logistic_regression,
        random_forest = result.random_forest,
        ensemble = result.ensemble,
        processing_time_us = elapsed.as_micros() as u64,
        "Prediction served"
    );

    Ok(Json(result))
}

/// `GET /health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "models": state.engine.model_names(),
    }))
}

/// `GET /stats`
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
