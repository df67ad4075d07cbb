//! ONNX classifier loading and inference

pub mod inference;
pub mod loader;
