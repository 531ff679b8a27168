//! Feature normalization for survival model inference.
//!
//! Turns a validated [`PredictionInput`] into the single-row feature vector
//! the models were trained on. The only derived field is `Title`, inferred
//! from `Sex` and `FamilySize` when the caller leaves it unset.

use crate::types::passenger::{PredictionInput, UNKNOWN};
use tracing::debug;

/// Column names in the order the training DataFrame declared them.
pub const FEATURE_COLUMNS: [&str; 10] = [
    "Pclass",
    "Sex",
    "Age",
    "Fare",
    "Embarked",
    "FamilySize",
    "isAlone",
    "Title",
    "TicketPrefix",
    "CabinLetter",
];

/// A single cell of the feature row.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl FeatureValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Single-row feature table: one value per entry of [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    /// Look up a column by name.
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        FEATURE_COLUMNS
            .iter()
            .position(|&name| name == column)
            .map(|idx| &self.values[idx])
    }

    /// Resolved title used for inference
    pub fn title(&self) -> &str {
        self.get("Title").and_then(FeatureValue::as_text).unwrap_or(UNKNOWN)
    }

    /// `(column, value)` pairs in column order
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        FEATURE_COLUMNS.iter().copied().zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Infer a title from sex and family size.
///
/// Returns `None` when `sex` is neither "male" nor "female" (exact match);
/// the title then stays at the sentinel.
pub fn infer_title(sex: &str, family_size: i64) -> Option<&'static str> {
    match sex {
        "male" => Some("Mr"),
        "female" if family_size > 1 => Some("Mrs"),
        "female" => Some("Miss"),
        _ => None,
    }
}

/// Builds model input rows from passenger attributes.
///
/// Stateless; a single instance is shared by every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureNormalizer;

impl FeatureNormalizer {
    /// Create a new feature normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Resolve the title and assemble the feature row.
    ///
    /// A caller-supplied title passes through verbatim. `TicketPrefix` and
    /// `CabinLetter` are never altered.
    pub fn normalize(&self, input: PredictionInput) -> FeatureVector {
        let title = if input.title_is_unknown() {
            match infer_title(&input.sex, input.family_size) {
                Some(title) => title.to_string(),
                None => {
                    debug!(sex = %input.sex, "Title left unresolved for unrecognized sex");
                    input.title
                }
            }
        } else {
            input.title
        };

        FeatureVector {
            values: vec![
                FeatureValue::Int(input.pclass),
                FeatureValue::Text(input.sex),
                FeatureValue::Int(input.age),
                FeatureValue::Float(input.fare),
                FeatureValue::Text(input.embarked),
                FeatureValue::Int(input.family_size),
                FeatureValue::Bool(input.is_alone),
                FeatureValue::Text(title),
                FeatureValue::Text(input.ticket_prefix),
                FeatureValue::Text(input.cabin_letter),
            ],
        }
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COLUMNS.len()
    }

    /// Get feature names in column order.
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    const TITLES: [&str; 8] = ["Mr", "Mrs", "Miss", "Master", "Dr", "Rev", "Col", "Countess"];

    fn random_input<R: Rng>(rng: &mut R, sex: &str) -> PredictionInput {
        let family_size = rng.gen_range(1..=11);
        PredictionInput::new(
            rng.gen_range(1..=3),
            sex,
            rng.gen_range(0..=80),
            rng.gen_range(0.0..512.0),
            *["C", "Q", "S"].choose(rng).unwrap(),
            family_size,
            family_size == 1,
        )
    }

    #[test]
    fn test_feature_layout() {
        let normalizer = FeatureNormalizer::new();
        let input = PredictionInput::new(3, "male", 22, 7.25, "S", 1, true)
            .with_ticket_prefix("A/5")
            .with_cabin_letter("C");

        let features = normalizer.normalize(input);

        assert_eq!(features.len(), normalizer.feature_count());
        let names: Vec<&str> = features.columns().map(|(name, _)| name).collect();
        assert_eq!(names, normalizer.feature_names());
        assert_eq!(features.get("Pclass"), Some(&FeatureValue::Int(3)));
        assert_eq!(features.get("Fare"), Some(&FeatureValue::Float(7.25)));
        assert_eq!(features.get("isAlone"), Some(&FeatureValue::Bool(true)));
        assert_eq!(features.get("TicketPrefix"), Some(&FeatureValue::Text("A/5".into())));
        assert_eq!(features.get("CabinLetter"), Some(&FeatureValue::Text("C".into())));
        assert_eq!(features.get("familySize"), None);
    }

    #[test]
    fn test_male_resolves_to_mr() {
        let normalizer = FeatureNormalizer::new();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let features = normalizer.normalize(random_input(&mut rng, "male"));
            assert_eq!(features.title(), "Mr");
        }
    }

    #[test]
    fn test_female_resolves_by_family_size() {
        let normalizer = FeatureNormalizer::new();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let input = random_input(&mut rng, "female");
            let expected = if input.family_size > 1 { "Mrs" } else { "Miss" };
            assert_eq!(normalizer.normalize(input).title(), expected);
        }
    }

    #[test]
    fn test_female_boundary() {
        let normalizer = FeatureNormalizer::new();
        let alone = PredictionInput::new(2, "female", 30, 10.5, "S", 1, true);
        let pair = PredictionInput::new(2, "female", 30, 10.5, "S", 2, false);
        let zero = PredictionInput::new(2, "female", 30, 10.5, "S", 0, true);

        assert_eq!(normalizer.normalize(alone).title(), "Miss");
        assert_eq!(normalizer.normalize(pair).title(), "Mrs");
        assert_eq!(normalizer.normalize(zero).title(), "Miss");
    }

    #[test]
    fn test_explicit_title_passes_through() {
        let normalizer = FeatureNormalizer::new();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let sex = *["male", "female", "other"].choose(&mut rng).unwrap();
            let title = *TITLES.choose(&mut rng).unwrap();
            let input = random_input(&mut rng, sex).with_title(title);
            assert_eq!(normalizer.normalize(input).title(), title);
        }
    }

    #[test]
    fn test_unrecognized_sex_keeps_unknown() {
        let normalizer = FeatureNormalizer::new();
        for sex in ["Male", "FEMALE", "", "x"] {
            let input = PredictionInput::new(1, sex, 40, 80.0, "C", 3, false);
            assert_eq!(normalizer.normalize(input).title(), UNKNOWN);
        }
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = FeatureNormalizer::new();
        let input = PredictionInput::new(1, "female", 35, 53.1, "S", 2, false);
        assert_eq!(
            normalizer.normalize(input.clone()),
            normalizer.normalize(input)
        );
    }

    #[test]
    fn test_infer_title() {
        assert_eq!(infer_title("male", 5), Some("Mr"));
        assert_eq!(infer_title("female", 5), Some("Mrs"));
        assert_eq!(infer_title("female", 1), Some("Miss"));
        assert_eq!(infer_title("unspecified", 1), None);
    }
}
