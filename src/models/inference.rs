//! Side-by-side inference across the three survival models

use crate::feature_normalizer::FeatureVector;
use crate::metrics::ServiceMetrics;
use crate::models::classifier::Classifier;
use crate::types::prediction::PredictionResult;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// The three trained models, loaded once and shared read-only.
#[derive(Clone)]
pub struct ModelSet {
    pub logistic_regression: Arc<dyn Classifier>,
    pub random_forest: Arc<dyn Classifier>,
    pub ensemble: Arc<dyn Classifier>,
}

impl ModelSet {
    pub fn new(
        logistic_regression: Arc<dyn Classifier>,
        random_forest: Arc<dyn Classifier>,
        ensemble: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            logistic_regression,
            random_forest,
            ensemble,
        }
    }

    /// Models in response order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Classifier>> {
        [&self.logistic_regression, &self.random_forest, &self.ensemble].into_iter()
    }

    /// Get loaded model names
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|m| m.name().to_string()).collect()
    }
}

/// Multi-model inference engine.
///
/// Every model sees the identical feature row. Labels are reported
/// individually; there is no voting.
pub struct InferenceEngine {
    models: ModelSet,
    metrics: Option<Arc<ServiceMetrics>>,
}

impl InferenceEngine {
    pub fn new(models: ModelSet) -> Self {
        Self {
            models,
            metrics: None,
        }
    }

    /// Record per-model latency and labels into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<ServiceMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Get the number of loaded models
    pub fn model_count(&self) -> usize {
        self.models.iter().count()
    }

    /// Get loaded model names
    pub fn model_names(&self) -> Vec<String> {
        self.models.names()
    }

    /// Run all three models on `features`.
    ///
    /// Any model failure fails the whole prediction; no partial results.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let logistic_regression = self.run_single_model(&self.models.logistic_regression, features)?;
        let random_forest = self.run_single_model(&self.models.random_forest, features)?;
        let ensemble = self.run_single_model(&self.models.ensemble, features)?;

        let result = PredictionResult::new(logistic_regression, random_forest, ensemble);

        debug!(
            title = %features.title(),
            logistic_regression,
            random_forest,
            ensemble,
            unanimous = result.is_unanimous(),
            "Inference complete"
        );

        Ok(result)
    }

    fn run_single_model(&self, model: &Arc<dyn Classifier>, features: &FeatureVector) -> Result<u8> {
        let start = Instant::now();
        let label = model
            .predict(features)
            .with_context(|| format!("{} prediction failed", model.name()))?;

        if let Some(metrics) = &self.metrics {
            metrics.record_model_call(model.name(), start.elapsed(), label);
        }

        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_normalizer::FeatureNormalizer;
    use crate::types::passenger::PredictionInput;
    use anyhow::bail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedModel {
        name: &'static str,
        label: u8,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn new(name: &'static str, label: u8) -> Arc<Self> {
            Arc::new(Self {
                name,
                label,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Classifier for FixedModel {
        fn name(&self) -> &str {
            self.name
        }

        fn predict(&self, _features: &FeatureVector) -> Result<u8> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label)
        }
    }

    struct BrokenModel;

    impl Classifier for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict(&self, _features: &FeatureVector) -> Result<u8> {
            bail!("input FamilySize has the wrong shape")
        }
    }

    fn features() -> FeatureVector {
        FeatureNormalizer::new().normalize(PredictionInput::new(3, "male", 22, 7.25, "S", 1, true))
    }

    #[test]
    fn test_labels_are_reported_per_model() {
        let engine = InferenceEngine::new(ModelSet::new(
            FixedModel::new("logistic_regression", 0),
            FixedModel::new("random_forest", 1),
            FixedModel::new("ensemble", 1),
        ));

        let result = engine.predict(&features()).unwrap();
        assert_eq!(result, PredictionResult::new(0, 1, 1));
        assert_eq!(engine.model_count(), 3);
        assert_eq!(
            engine.model_names(),
            vec!["logistic_regression", "random_forest", "ensemble"]
        );
    }

    #[test]
    fn test_each_model_invoked_once() {
        let lr = FixedModel::new("logistic_regression", 1);
        let rf = FixedModel::new("random_forest", 1);
        let gb = FixedModel::new("ensemble", 1);
        let engine = InferenceEngine::new(ModelSet::new(lr.clone(), rf.clone(), gb.clone()));

        engine.predict(&features()).unwrap();

        assert_eq!(lr.calls.load(Ordering::SeqCst), 1);
        assert_eq!(rf.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gb.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_propagates_without_partial_result() {
        let engine = InferenceEngine::new(ModelSet::new(
            FixedModel::new("logistic_regression", 1),
            Arc::new(BrokenModel),
            FixedModel::new("ensemble", 0),
        ));

        let err = engine.predict(&features()).unwrap_err();
        assert!(format!("{:#}", err).contains("wrong shape"));
    }

    #[test]
    fn test_metrics_recorded_when_attached() {
        let metrics = Arc::new(ServiceMetrics::new());
        let engine = InferenceEngine::new(ModelSet::new(
            FixedModel::new("logistic_regression", 1),
            FixedModel::new("random_forest", 0),
            FixedModel::new("ensemble", 1),
        ))
        .with_metrics(metrics.clone());

        engine.predict(&features()).unwrap();

        let stats = metrics.get_model_stats();
        assert_eq!(stats.len(), 3);
        assert_eq!(stats["logistic_regression"].survived, 1);
        assert_eq!(stats["random_forest"].survived, 0);
    }
}
