//! Transaction schema for credit card fraud scoring

use crate::error::{FieldError, ValidationError};
use serde::{Deserialize, Serialize};

/// Number of features the classifier was trained on.
pub const FEATURE_COUNT: usize = 30;

/// A single credit card transaction submitted for scoring.
///
/// Field names match the training dataset columns: `Time`, the 28
/// anonymized principal components `V1..V28`, and `Amount`. All fields are
/// required; unknown fields are rejected at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    /// Seconds elapsed between this transaction and the first in the dataset
    #[serde(rename = "Time")]
    pub time: f64,

    #[serde(rename = "V1")]
    pub v1: f64,
    #[serde(rename = "V2")]
    pub v2: f64,
    #[serde(rename = "V3")]
    pub v3: f64,
    #[serde(rename = "V4")]
    pub v4: f64,
    #[serde(rename = "V5")]
    pub v5: f64,
    #[serde(rename = "V6")]
    pub v6: f64,
    #[serde(rename = "V7")]
    pub v7: f64,
    #[serde(rename = "V8")]
    pub v8: f64,
    #[serde(rename = "V9")]
    pub v9: f64,
    #[serde(rename = "V10")]
    pub v10: f64,
    #[serde(rename = "V11")]
    pub v11: f64,
    #[serde(rename = "V12")]
    pub v12: f64,
    #[serde(rename = "V13")]
    pub v13: f64,
    #[serde(rename = "V14")]
    pub v14: f64,
    #[serde(rename = "V15")]
    pub v15: f64,
    #[serde(rename = "V16")]
    pub v16: f64,
    #[serde(rename = "V17")]
    pub v17: f64,
    #[serde(rename = "V18")]
    pub v18: f64,
    #[serde(rename = "V19")]
    pub v19: f64,
    #[serde(rename = "V20")]
    pub v20: f64,
    #[serde(rename = "V21")]
    pub v21: f64,
    #[serde(rename = "V22")]
    pub v22: f64,
    #[serde(rename = "V23")]
    pub v23: f64,
    #[serde(rename = "V24")]
    pub v24: f64,
    #[serde(rename = "V25")]
    pub v25: f64,
    #[serde(rename = "V26")]
    pub v26: f64,
    #[serde(rename = "V27")]
    pub v27: f64,
    #[serde(rename = "V28")]
    pub v28: f64,

    /// Transaction amount
    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl Transaction {
    /// Wire field names, in model input order.
    pub const FIELD_NAMES: [&'static str; FEATURE_COUNT] = [
        "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13",
        "V14", "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26",
        "V27", "V28", "Amount",
    ];

    /// Field values in model input order. Must stay aligned with
    /// `FIELD_NAMES`.
    fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.time, self.v1, self.v2, self.v3, self.v4, self.v5, self.v6, self.v7, self.v8,
            self.v9, self.v10, self.v11, self.v12, self.v13, self.v14, self.v15, self.v16,
            self.v17, self.v18, self.v19, self.v20, self.v21, self.v22, self.v23, self.v24,
            self.v25, self.v26, self.v27, self.v28, self.amount,
        ]
    }

    /// Check that every field holds a finite number.
    ///
    /// Values outside physically plausible ranges (negative `Time`, extreme
    /// `Amount`) pass through unchanged; only NaN and infinities are
    /// rejected, each named in the returned error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let errors: Vec<FieldError> = Self::FIELD_NAMES
            .iter()
            .zip(self.values())
            .filter(|(_, value)| !value.is_finite())
            .map(|(name, value)| {
                FieldError::new(*name, format!("must be a finite number, got {value}"))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Assemble the model input vector.
    ///
    /// The classifier was trained on the exact column order
    /// `[Time, V1..V28, Amount]`; any reordering silently corrupts
    /// predictions.
    pub fn feature_vector(&self) -> [f32; FEATURE_COUNT] {
        self.values().map(|value| value as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample_value() -> Value {
        let mut map = serde_json::Map::new();
        for (i, name) in Transaction::FIELD_NAMES.iter().enumerate() {
            map.insert((*name).to_string(), json!(i as f64 * 0.5));
        }
        Value::Object(map)
    }

    #[test]
    fn test_deserialize_full_record() {
        let tx: Transaction = serde_json::from_value(sample_value()).unwrap();
        assert_eq!(tx.time, 0.0);
        assert_eq!(tx.v1, 0.5);
        assert_eq!(tx.amount, 14.5);
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let mut value = sample_value();
        value.as_object_mut().unwrap().remove("V7");

        let err = serde_json::from_value::<Transaction>(value).unwrap_err();
        assert!(err.to_string().contains("V7"), "error was: {err}");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut value = sample_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("V29".to_string(), json!(1.0));

        let err = serde_json::from_value::<Transaction>(value).unwrap_err();
        assert!(err.to_string().contains("V29"), "error was: {err}");
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let mut value = sample_value();
        value
            .as_object_mut()
            .unwrap()
            .insert("Amount".to_string(), json!("12.50"));

        assert!(serde_json::from_value::<Transaction>(value).is_err());
    }

    #[test]
    fn test_validate_accepts_implausible_but_finite_values() {
        let tx = Transaction {
            time: -1.0,
            amount: 1e12,
            ..Default::default()
        };
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_validate_names_every_non_finite_field() {
        let tx = Transaction {
            v1: f64::NAN,
            v14: f64::INFINITY,
            amount: f64::NEG_INFINITY,
            ..Default::default()
        };

        let err = tx.validate().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["V1", "V14", "Amount"]);
    }

    #[test]
    fn test_feature_vector_order() {
        let tx = Transaction {
            time: 1.0,
            v1: 2.0,
            v2: 3.0,
            v28: 4.0,
            amount: 5.0,
            ..Default::default()
        };

        let features = tx.feature_vector();
        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features[0], 1.0); // Time first
        assert_eq!(features[1], 2.0); // V1
        assert_eq!(features[2], 3.0); // V2
        assert_eq!(features[28], 4.0); // V28
        assert_eq!(features[29], 5.0); // Amount last
    }

    #[test]
    fn test_swapping_v1_v2_swaps_vector_positions() {
        let tx = Transaction {
            v1: 0.25,
            v2: -0.75,
            ..Default::default()
        };
        let swapped = Transaction {
            v1: -0.75,
            v2: 0.25,
            ..Default::default()
        };

        let a = tx.feature_vector();
        let b = swapped.feature_vector();
        assert_ne!(a, b);
        assert_eq!(a[1], b[2]);
        assert_eq!(a[2], b[1]);
    }

    #[test]
    fn test_serialization_round_trip() {
        let tx = Transaction {
            time: 406.0,
            v1: -2.312,
            amount: 239.93,
            ..Default::default()
        };

        let json = serde_json::to_string(&tx).unwrap();
        let deserialized: Transaction = serde_json::from_str(&json).unwrap();

        assert_eq!(tx.time, deserialized.time);
        assert_eq!(tx.v1, deserialized.v1);
        assert_eq!(tx.amount, deserialized.amount);
    }
}
