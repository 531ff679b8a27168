//! Running a loaded ONNX model on one feature row

use crate::feature_normalizer::{FeatureValue, FeatureVector};
use crate::models::classifier::{binary_label, Classifier};
use crate::models::loader::LoadedModel;
use anyhow::{anyhow, bail, Context, Result};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor};
use tracing::trace;

/// A feature cell converted to the element type a graph input declares.
#[derive(Debug, Clone, PartialEq)]
pub enum InputCell {
    Int64(i64),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    Text(String),
}

impl InputCell {
    /// Convert `value` for an input of type `ty`.
    ///
    /// Text never converts to a number, and fractional values never convert
    /// to integers; either means the model was trained on a different schema.
    pub fn convert(column: &str, value: &FeatureValue, ty: TensorElementType) -> Result<Self> {
        let cell = match (value, ty) {
            (FeatureValue::Int(v), TensorElementType::Int64) => InputCell::Int64(*v),
            (FeatureValue::Int(v), TensorElementType::Int32) => InputCell::Int32(
                i32::try_from(*v).with_context(|| format!("Column {} overflows int32", column))?,
            ),
            (FeatureValue::Int(v), TensorElementType::Float32) => InputCell::Float32(*v as f32),
            (FeatureValue::Int(v), TensorElementType::Float64) => InputCell::Float64(*v as f64),
            (FeatureValue::Float(v), TensorElementType::Float32) => InputCell::Float32(*v as f32),
            (FeatureValue::Float(v), TensorElementType::Float64) => InputCell::Float64(*v),
            (FeatureValue::Bool(v), TensorElementType::Bool) => InputCell::Bool(*v),
            (FeatureValue::Bool(v), TensorElementType::Int64) => InputCell::Int64(i64::from(*v)),
            (FeatureValue::Bool(v), TensorElementType::Int32) => InputCell::Int32(i32::from(*v)),
            (FeatureValue::Bool(v), TensorElementType::Float32) => {
                InputCell::Float32(if *v { 1.0 } else { 0.0 })
            }
            (FeatureValue::Bool(v), TensorElementType::Float64) => {
                InputCell::Float64(if *v { 1.0 } else { 0.0 })
            }
            (FeatureValue::Text(v), TensorElementType::String) => InputCell::Text(v.clone()),
            (value, ty) => bail!(
                "Column {} value {:?} cannot feed an input of type {:?}",
                column,
                value,
                ty
            ),
        };
        Ok(cell)
    }

    /// Build a `[1, 1]` tensor holding this cell.
    fn into_value(self) -> Result<DynValue> {
        let shape = vec![1_i64, 1];
        let value = match self {
            InputCell::Int64(v) => Tensor::from_array((shape, vec![v]))?.into_dyn(),
            InputCell::Int32(v) => Tensor::from_array((shape, vec![v]))?.into_dyn(),
            InputCell::Float32(v) => Tensor::from_array((shape, vec![v]))?.into_dyn(),
            InputCell::Float64(v) => Tensor::from_array((shape, vec![v]))?.into_dyn(),
            InputCell::Bool(v) => Tensor::from_array((shape, vec![v]))?.into_dyn(),
            InputCell::Text(v) => Tensor::from_string_array((shape, &[v][..]))?.into_dyn(),
        };
        Ok(value)
    }
}

/// Whole-number float label as an integer; anything else is a model fault.
fn float_label(value: f32, model: &str) -> Result<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        bail!("Model {} returned non-integral label {}", model, value);
    }
    Ok(value as i64)
}

impl LoadedModel {
    /// Bind every graph input to the feature column of the same name.
    fn bind_inputs(&self, features: &FeatureVector) -> Result<Vec<(String, DynValue)>> {
        self.inputs
            .iter()
            .map(|input| {
                let value = features.get(&input.name).ok_or_else(|| {
                    anyhow!(
                        "Model {} expects input {} which is not a feature column",
                        self.name,
                        input.name
                    )
                })?;
                let ty = input.element_type.ok_or_else(|| {
                    anyhow!("Model {} input {} is not a tensor", self.name, input.name)
                })?;
                let tensor = InputCell::convert(&input.name, value, ty)?.into_value()?;
                Ok((input.name.clone(), tensor))
            })
            .collect()
    }
}

impl Classifier for LoadedModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        let inputs = self.bind_inputs(features)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;
        let outputs = session
            .run(inputs)
            .with_context(|| format!("Model {} inference failed", self.name))?;

        let output = outputs
            .get(self.label_output.as_str())
            .ok_or_else(|| anyhow!("Model {} produced no {} output", self.name, self.label_output))?;

        // Classifiers export labels as int64; some boosters emit floats instead
        let raw = if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            data.first().copied()
        } else {
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .with_context(|| format!("Model {} label is neither int64 nor float", self.name))?;
            data.first()
                .map(|&v| float_label(v, &self.name))
                .transpose()?
        };
        let raw = raw.ok_or_else(|| anyhow!("Model {} returned an empty label tensor", self.name))?;

        trace!(model = %self.name, label = raw, "Extracted label");
        binary_label(raw, &self.name)
    }
}
