//! Titanic Survival Prediction Service Library
//!
//! Accepts passenger attributes over HTTP and returns the labels of three
//! pre-trained classifiers (logistic regression, random forest and a
//! gradient-boosted ensemble) side by side.

pub mod config;
pub mod feature_normalizer;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use feature_normalizer::{FeatureNormalizer, FeatureVector};
pub use metrics::ServiceMetrics;
pub use models::{Classifier, InferenceEngine, ModelLoader, ModelSet};
pub use server::{create_router, AppState};
pub use types::{PredictionInput, PredictionResult};
