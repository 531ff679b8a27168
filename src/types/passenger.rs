//! Passenger attributes accepted by the prediction endpoint

use crate::types::lax;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder for an optional attribute the caller did not supply.
pub const UNKNOWN: &str = "unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Absent and `null` both resolve to the sentinel.
fn or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown))
}

/// Raw passenger attributes as submitted by the caller.
///
/// Field names on the wire match the columns the models were trained on.
/// Numeric and boolean fields also accept the string forms a browser form posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    /// Passenger class (1, 2 or 3)
    #[serde(rename = "Pclass", deserialize_with = "lax::int")]
    pub pclass: i64,

    /// "male" or "female"; not constrained beyond being a string
    #[serde(rename = "Sex")]
    pub sex: String,

    #[serde(rename = "Age", deserialize_with = "lax::int")]
    pub age: i64,

    #[serde(rename = "Fare", deserialize_with = "lax::float")]
    pub fare: f64,

    /// Port of embarkation code (C, Q, S)
    #[serde(rename = "Embarked")]
    pub embarked: String,

    /// Accompanying relatives plus the passenger
    #[serde(rename = "FamilySize", deserialize_with = "lax::int")]
    pub family_size: i64,

    #[serde(rename = "isAlone", deserialize_with = "lax::boolean")]
    pub is_alone: bool,

    #[serde(rename = "Title", default = "unknown", deserialize_with = "or_unknown")]
    pub title: String,

    #[serde(
        rename = "TicketPrefix",
        default = "unknown",
        deserialize_with = "or_unknown"
    )]
    pub ticket_prefix: String,

    #[serde(
        rename = "CabinLetter",
        default = "unknown",
        deserialize_with = "or_unknown"
    )]
    pub cabin_letter: String,
}

impl PredictionInput {
    /// Create an input with the required fields; optional fields take the sentinel.
    pub fn new(
        pclass: i64,
        sex: impl Into<String>,
        age: i64,
        fare: f64,
        embarked: impl Into<String>,
        family_size: i64,
        is_alone: bool,
    ) -> Self {
        Self {
            pclass,
            sex: sex.into(),
            age,
            fare,
            embarked: embarked.into(),
            family_size,
            is_alone,
            title: unknown(),
            ticket_prefix: unknown(),
            cabin_letter: unknown(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_ticket_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ticket_prefix = prefix.into();
        self
    }

    pub fn with_cabin_letter(mut self, letter: impl Into<String>) -> Self {
        self.cabin_letter = letter.into();
        self
    }

    /// Whether the caller left `Title` for the service to infer.
    pub fn title_is_unknown(&self) -> bool {
        self.title == UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_to_unknown() {
        let input: PredictionInput = serde_json::from_str(
            r#"{"Pclass":3,"Sex":"male","Age":22,"Fare":7.25,"Embarked":"S","FamilySize":1,"isAlone":true}"#,
        )
        .unwrap();

        assert_eq!(input.title, UNKNOWN);
        assert_eq!(input.ticket_prefix, UNKNOWN);
        assert_eq!(input.cabin_letter, UNKNOWN);
        assert!(input.title_is_unknown());
    }

    #[test]
    fn test_null_optional_field_is_unknown() {
        let input: PredictionInput = serde_json::from_str(
            r#"{"Pclass":1,"Sex":"female","Age":35,"Fare":53.1,"Embarked":"S","FamilySize":2,"isAlone":false,"Title":null,"CabinLetter":"C"}"#,
        )
        .unwrap();

        assert_eq!(input.title, UNKNOWN);
        assert_eq!(input.cabin_letter, "C");
    }

    #[test]
    fn test_integer_fare_is_accepted() {
        let input: PredictionInput = serde_json::from_str(
            r#"{"Pclass":2,"Sex":"male","Age":40,"Fare":13,"Embarked":"Q","FamilySize":1,"isAlone":true}"#,
        )
        .unwrap();

        assert_eq!(input.fare, 13.0);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let err = serde_json::from_str::<PredictionInput>(
            r#"{"Pclass":3,"Sex":"male","Age":22,"Embarked":"S","FamilySize":1,"isAlone":true}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Fare"));
    }

    #[test]
    fn test_form_encoded_values_are_coerced() {
        let input: PredictionInput = serde_json::from_str(
            r#"{"Pclass":"3","Sex":"male","Age":"22","Fare":"7.25","Embarked":"S","FamilySize":"1","isAlone":true,"Title":"Mr","TicketPrefix":"A/5","CabinLetter":"C"}"#,
        )
        .unwrap();

        assert_eq!(input.pclass, 3);
        assert_eq!(input.age, 22);
        assert_eq!(input.fare, 7.25);
        assert_eq!(input.family_size, 1);
        assert!(input.is_alone);
    }

    #[test]
    fn test_integral_float_age_is_accepted() {
        let input: PredictionInput = serde_json::from_str(
            r#"{"Pclass":1,"Sex":"female","Age":22.0,"Fare":53.1,"Embarked":"S","FamilySize":2,"isAlone":"false"}"#,
        )
        .unwrap();

        assert_eq!(input.age, 22);
        assert!(!input.is_alone);
    }

    #[test]
    fn test_fractional_age_is_rejected() {
        let result = serde_json::from_str::<PredictionInput>(
            r#"{"Pclass":1,"Sex":"female","Age":22.5,"Fare":53.1,"Embarked":"S","FamilySize":2,"isAlone":false}"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_mistyped_field_is_rejected() {
        let result = serde_json::from_str::<PredictionInput>(
            r#"{"Pclass":"first","Sex":"male","Age":22,"Fare":7.25,"Embarked":"S","FamilySize":1,"isAlone":true}"#,
        );

        assert!(result.is_err());
    }
}
