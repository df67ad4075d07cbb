//! Prediction result returned by the API

use serde::{Deserialize, Serialize};

/// Outcome of scoring a single transaction.
///
/// Both fields come from the same classifier run; a result is never
/// produced with only one of them populated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// True when the classifier labels the transaction as fraud
    pub fraud_prediction: bool,
    /// Probability of the fraud class, in [0, 1]
    pub fraud_probability: f64,
}
