//! Type definitions for the fraud detection API

pub mod api;
pub mod prediction;
pub mod transaction;
