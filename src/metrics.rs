//! Request and per-model statistics for the prediction service.

use crate::types::prediction::PredictionResult;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

const LATENCY_WINDOW: usize = 10_000;
const MODEL_WINDOW: usize = 1_000;

/// Latency samples and label tally for one model
#[derive(Default)]
struct ModelWindow {
    times_us: Vec<u64>,
    calls: u64,
    survived: u64,
}

/// Metrics collector for the prediction service
pub struct ServiceMetrics {
    /// Predictions returned successfully
    pub predictions_served: AtomicU64,
    /// Requests rejected by schema validation
    pub requests_rejected: AtomicU64,
    /// Requests that failed during inference
    pub inference_failures: AtomicU64,
    /// Predictions where all three models agreed
    unanimous_predictions: AtomicU64,
    /// End-to-end request times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Per-model inference windows
    models: RwLock<HashMap<String, ModelWindow>>,
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            unanimous_predictions: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            models: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, processing_time: Duration, result: &PredictionResult) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if result.is_unanimous() {
            self.unanimous_predictions.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Record a request rejected before normalization
    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that failed in a model
    pub fn record_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one model invocation
    pub fn record_model_call(&self, model_name: &str, duration: Duration, label: u8) {
        if let Ok(mut models) = self.models.write() {
            let window = models.entry(model_name.to_string()).or_default();
            window.calls += 1;
            window.survived += u64::from(label);
            window.times_us.push(duration.as_micros() as u64);
            if window.times_us.len() > MODEL_WINDOW {
                window.times_us.drain(0..MODEL_WINDOW / 2);
            }
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        match self.processing_times.read() {
            Ok(times) => ProcessingStats::from_samples(&times),
            Err(_) => ProcessingStats::default(),
        }
    }

    /// Get model performance stats
    pub fn get_model_stats(&self) -> HashMap<String, ModelStats> {
        let Ok(models) = self.models.read() else {
            return HashMap::new();
        };

        models
            .iter()
            .map(|(name, window)| {
                let latency = ProcessingStats::from_samples(&window.times_us);
                (
                    name.clone(),
                    ModelStats {
                        calls: window.calls,
                        survived: window.survived,
                        mean_us: latency.mean_us,
                        p50_us: latency.p50_us,
                        p99_us: latency.p99_us,
                    },
                )
            })
            .collect()
    }

    /// Fraction of served predictions where all models agreed
    pub fn get_agreement_rate(&self) -> f64 {
        let served = self.predictions_served.load(Ordering::Relaxed);
        if served == 0 {
            return 0.0;
        }
        self.unanimous_predictions.load(Ordering::Relaxed) as f64 / served as f64
    }

    /// Get current throughput (predictions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Serializable view for the stats endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            agreement_rate: self.get_agreement_rate(),
            throughput: self.get_throughput(),
            processing: self.get_processing_stats(),
            models: self.get_model_stats(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();

        info!(
            predictions = snapshot.predictions_served,
            rejected = snapshot.requests_rejected,
            failed = snapshot.inference_failures,
            throughput = format!("{:.2} req/s", snapshot.throughput),
            agreement = format!("{:.1}%", snapshot.agreement_rate * 100.0),
            "Prediction service summary"
        );
        info!(
            mean_us = snapshot.processing.mean_us,
            p50_us = snapshot.processing.p50_us,
            p95_us = snapshot.processing.p95_us,
            p99_us = snapshot.processing.p99_us,
            max_us = snapshot.processing.max_us,
            "Request latency"
        );

        let mut models: Vec<_> = snapshot.models.iter().collect();
        models.sort_by(|a, b| a.0.cmp(b.0));
        for (model, stats) in models {
            let survival_rate = if stats.calls > 0 {
                stats.survived as f64 / stats.calls as f64 * 100.0
            } else {
                0.0
            };
            info!(
                model = %model,
                calls = stats.calls,
                survival_rate = format!("{:.1}%", survival_rate),
                mean_us = stats.mean_us,
                p99_us = stats.p99_us,
                "Model statistics"
            );
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

impl ProcessingStats {
    fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        Self {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }
}

/// Model-specific statistics
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub calls: u64,
    /// Calls that predicted survival
    pub survived: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

/// Point-in-time copy of all service metrics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub predictions_served: u64,
    pub requests_rejected: u64,
    pub inference_failures: u64,
    pub agreement_rate: f64,
    pub throughput: f64,
    pub processing: ProcessingStats,
    pub models: HashMap<String, ModelStats>,
}

/// Periodic metrics summary in the logs
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
