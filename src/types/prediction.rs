//! Prediction response data structures

use serde::{Deserialize, Serialize};

/// Labels from the three models, side by side.
///
/// Each label is 0 (did not survive) or 1 (survived). The models are not
/// combined; callers compare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Logistic Regression Prediction")]
    pub logistic_regression: u8,

    #[serde(rename = "Random Forest Prediction")]
    pub random_forest: u8,

    #[serde(rename = "Ensemble Model Prediction")]
    pub ensemble: u8,
}

impl PredictionResult {
    pub fn new(logistic_regression: u8, random_forest: u8, ensemble: u8) -> Self {
        Self {
            logistic_regression,
            random_forest,
            ensemble,
        }
    }

    /// Labels in model order: logistic regression, random forest, ensemble
    pub fn labels(&self) -> [u8; 3] {
        [self.logistic_regression, self.random_forest, self.ensemble]
    }

    /// True when all three models produced the same label
    pub fn is_unanimous(&self) -> bool {
        let [first, rest @ ..] = self.labels();
        rest.iter().all(|&label| label == first)
    }
}
