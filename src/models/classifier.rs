//! Classifier abstraction shared by ONNX-backed and in-memory models

use crate::feature_normalizer::FeatureVector;
use anyhow::{bail, Result};

/// A pre-trained binary classifier.
///
/// Implementations are read-only after construction and shared across requests.
pub trait Classifier: Send + Sync {
    /// Model name used in logs and metrics
    fn name(&self) -> &str;

    /// Predict the label (0 or 1) for a single feature row.
    fn predict(&self, features: &FeatureVector) -> Result<u8>;
}

/// Coerce a raw model label into 0 or 1.
pub fn binary_label(raw: i64, model: &str) -> Result<u8> {
    match raw {
        0 => Ok(0),
        1 => Ok(1),
        other => bail!("Model {} produced non-binary label {}", model, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_label() {
        assert_eq!(binary_label(0, "m").unwrap(), 0);
        assert_eq!(binary_label(1, "m").unwrap(), 1);
        assert!(binary_label(2, "m").is_err());
        assert!(binary_label(-1, "m").is_err());
    }
}
