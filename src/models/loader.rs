//! ONNX model loader

use crate::config::ModelsConfig;
use crate::models::classifier::Classifier;
use crate::models::inference::ModelSet;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::ValueType;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// A graph input and the element type it declares.
#[derive(Debug, Clone)]
pub struct ModelInput {
    /// Column name the input is bound to
    pub name: String,
    /// `None` for non-tensor inputs, which cannot be fed
    pub element_type: Option<TensorElementType>,
}

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session; `run` needs exclusive access
    pub session: Mutex<Session>,
    /// Graph inputs, one per feature column
    pub inputs: Vec<ModelInput>,
    /// Output holding the predicted label
    pub label_output: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load a single ONNX model from file
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();

        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model {} from {}", name, path.display()))?;

        let inputs: Vec<ModelInput> = session
            .inputs
            .iter()
            .map(|input| ModelInput {
                name: input.name.clone(),
                element_type: match &input.input_type {
                    ValueType::Tensor { ty, .. } => Some(*ty),
                    _ => None,
                },
            })
            .collect();

        let label_output = session
            .outputs
            .iter()
            .find(|o| o.name == "label" || o.name == "output_label")
            .or_else(|| session.outputs.iter().find(|o| o.name.contains("label")))
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .with_context(|| format!("Model {} declares no outputs", name))?;

        info!(
            model = %name,
            inputs = ?inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            output = %label_output,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session: Mutex::new(session),
            inputs,
            label_output,
        })
    }

    /// Load the three models named in the configuration.
    ///
    /// All three must load; a single failure aborts.
    pub fn load_model_set(&self, config: &ModelsConfig) -> Result<ModelSet> {
        let logistic = self.load_model(config.logistic_regression_path(), "logistic_regression")?;
        let random_forest = self.load_model(config.random_forest_path(), "random_forest")?;
        let ensemble = self.load_model(config.ensemble_path(), "ensemble")?;

        info!(models_dir = %config.models_dir, "Loaded 3 models");

        Ok(ModelSet::new(
            Arc::new(logistic) as Arc<dyn Classifier>,
            Arc::new(random_forest),
            Arc::new(ensemble),
        ))
    }
}
