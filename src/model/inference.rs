//! Single-model inference for fraud detection

use crate::config::AppConfig;
use crate::model::loader::{LoadedModel, ModelLoader};
use crate::types::prediction::PredictionResult;
use crate::types::transaction::{Transaction, FEATURE_COUNT};
use anyhow::{anyhow, bail, Context, Result};
use ort::memory::Allocator;
use ort::session::SessionOutputs;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use std::sync::RwLock;
use tracing::debug;

/// Inference engine holding the loaded classifier.
///
/// The session sits behind an `RwLock` because ort needs exclusive access
/// for the duration of a run; the engine itself is immutable after startup
/// and is shared across workers behind an `Arc`.
pub struct InferenceEngine {
    model: RwLock<LoadedModel>,
}

impl InferenceEngine {
    /// Create the engine from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.model.onnx_threads)?;
        let model = loader.load(&config.model.path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Create the engine from an explicit artifact path.
    pub fn from_model_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let loader = ModelLoader::new()?;
        let model = loader.load(path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Score a transaction.
    ///
    /// Runs the classifier once and decodes both outputs: the boolean fraud
    /// label and the fraud-class probability. Both come from the same run;
    /// if either cannot be decoded the whole call fails and no partial
    /// result is produced.
    pub fn predict(&self, transaction: &Transaction) -> Result<PredictionResult> {
        let features = transaction.feature_vector();
        let shape = vec![1_i64, FEATURE_COUNT as i64];
        let input = Tensor::from_array((shape, features.to_vec()))
            .context("failed to build input tensor")?;

        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow!("model lock poisoned: {e}"))?;

        // Names are cloned up front: `outputs` borrows the session for as
        // long as it lives.
        let input_name = model.input_name.clone();
        let label_output = model.label_output.clone();
        let prob_output = model.prob_output.clone();

        let outputs = model
            .session
            .run(ort::inputs![&input_name => input])
            .context("classifier run failed")?;

        let fraud_prediction = extract_label(&outputs, &label_output)?;
        let fraud_probability = extract_probability(&outputs, &prob_output)?;

        if !fraud_probability.is_finite() || !(0.0..=1.0).contains(&fraud_probability) {
            bail!("classifier returned an out-of-range probability: {fraud_probability}");
        }

        debug!(
            fraud = fraud_prediction,
            probability = fraud_probability,
            "Inference complete"
        );

        Ok(PredictionResult {
            fraud_prediction,
            fraud_probability,
        })
    }
}

/// Decode the boolean fraud label from the label output.
fn extract_label(outputs: &SessionOutputs, label_output: &str) -> Result<bool> {
    let value = outputs
        .get(label_output)
        .ok_or_else(|| anyhow!("missing label output `{label_output}`"))?;

    if let Ok((_, data)) = value.try_extract_tensor::<i64>() {
        return decode_label(data).ok_or_else(|| anyhow!("empty label tensor"));
    }

    // Some exporters emit the label as a float tensor
    if let Ok((_, data)) = value.try_extract_tensor::<f32>() {
        return data
            .first()
            .map(|&label| label >= 0.5)
            .ok_or_else(|| anyhow!("empty label tensor"));
    }

    bail!("label output `{label_output}` has an unsupported type")
}

/// Decode the fraud-class probability from the probabilities output.
///
/// Handles both tensor outputs and the `seq(map(int64, float))` shape
/// emitted by some boosting-library exporters. An output that cannot be
/// decoded is an inference failure, never a default score.
fn extract_probability(outputs: &SessionOutputs, prob_output: &str) -> Result<f64> {
    if let Some(value) = outputs.get(prob_output) {
        if let Some(prob) = try_probability(value) {
            return Ok(prob);
        }
    }

    // Fallback: scan the remaining outputs, skipping the label
    for (name, value) in outputs.iter() {
        if name.contains("label") {
            continue;
        }
        if let Some(prob) = try_probability(&value) {
            debug!(output = %name, "Probability decoded from fallback output");
            return Ok(prob);
        }
    }

    bail!("no probability output could be decoded")
}

fn try_probability(value: &ort::value::DynValue) -> Option<f64> {
    if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
        let dims: Vec<i64> = shape.iter().copied().collect();
        return positive_class_probability(&dims, data);
    }

    let dtype = value.dtype();
    if DynSequenceValueType::can_downcast(&dtype) {
        if let Ok(prob) = probability_from_sequence_map(value) {
            return Some(prob);
        }
    }

    None
}

/// Extract the fraud-class probability from `seq(map(int64, float))`.
fn probability_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow!("failed to downcast to sequence: {e}"))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
    let map_value = maps.first().ok_or_else(|| anyhow!("empty probability sequence"))?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    // Class 1 is the fraud class
    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            return Ok(*prob as f64);
        }
    }
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    bail!("no class probability found in map")
}

fn decode_label(data: &[i64]) -> Option<bool> {
    data.first().map(|&label| label != 0)
}

/// Pick the positive-class probability out of a probabilities tensor.
///
/// Binary classifiers exported from sklearn produce `[batch, 2]`;
/// single-output models produce `[batch, 1]` or `[1]`.
fn positive_class_probability(dims: &[i64], data: &[f32]) -> Option<f64> {
    match *dims {
        [_, classes] if classes >= 2 => data.get(1).map(|&p| p as f64),
        [_, 1] => data.first().map(|&p| p as f64),
        [classes] if classes >= 2 => data.get(1).map(|&p| p as f64),
        [1] => data.first().map(|&p| p as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Engine tests exercising a real session require the ONNX artifact on
    // disk; the pure decoding helpers are covered here instead.

    #[test]
    fn test_decode_label() {
        assert_eq!(decode_label(&[0]), Some(false));
        assert_eq!(decode_label(&[1]), Some(true));
        assert_eq!(decode_label(&[]), None);
    }

    #[test]
    fn test_probability_from_two_class_tensor() {
        // [batch, 2]: class 0 then class 1
        let prob = positive_class_probability(&[1, 2], &[0.98, 0.02]).unwrap();
        assert!((prob - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_probability_from_single_output_tensor() {
        let prob = positive_class_probability(&[1, 1], &[0.73]).unwrap();
        assert!((prob - 0.73).abs() < 1e-6);

        let prob = positive_class_probability(&[1], &[0.73]).unwrap();
        assert!((prob - 0.73).abs() < 1e-6);
    }

    #[test]
    fn test_probability_from_flat_two_class_tensor() {
        let prob = positive_class_probability(&[2], &[0.6, 0.4]).unwrap();
        assert!((prob - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_unsupported_shape_yields_none() {
        assert!(positive_class_probability(&[], &[]).is_none());
        assert!(positive_class_probability(&[1, 2], &[0.5]).is_none());
    }
}
