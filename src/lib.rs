//! Credit Card Fraud Detection API Library
//!
//! Serves a pre-trained binary fraud classifier over HTTP: given the 30
//! numeric features of a transaction, returns a boolean prediction and a
//! fraud probability. The model is loaded once at startup and is immutable
//! for the process lifetime.

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod routes;
pub mod types;

pub use config::AppConfig;
pub use error::{ApiError, ValidationError};
pub use metrics::RequestMetrics;
pub use model::inference::InferenceEngine;
pub use types::{prediction::PredictionResult, transaction::Transaction};
