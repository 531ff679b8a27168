//! Shared, read-only request context

use crate::feature_normalizer::FeatureNormalizer;
use crate::metrics::ServiceMetrics;
use crate::models::inference::{InferenceEngine, ModelSet};
use std::sync::Arc;

/// Everything a handler needs, built once at startup and passed to the router.
pub struct AppState {
    pub normalizer: FeatureNormalizer,
    pub engine: InferenceEngine,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    /// Wire a model set to fresh metrics.
    pub fn new(models: ModelSet) -> Self {
        Self::with_metrics(models, Arc::new(ServiceMetrics::new()))
    }

    pub fn with_metrics(models: ModelSet, metrics: Arc<ServiceMetrics>) -> Self {
        Self {
            normalizer: FeatureNormalizer::new(),
            engine: InferenceEngine::new(models).with_metrics(metrics.clone()),
            metrics,
        }
    }
}
