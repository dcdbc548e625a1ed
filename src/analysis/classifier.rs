// Classifier - speaker confidence prediction from log-mel features
//
// The model itself is opaque: anything implementing ConfidenceModel that
// maps a (1, mels, frames, 1) input to two class probabilities will do.
// This module owns the parts around it: building the model input from a
// FeatureMatrix, validating the output, and deriving label + percentage.
//
// Class layout (fixed by training):
// - index 0: non confident
// - index 1: confident

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::features::FeatureMatrix;
use crate::config::ModelConfig;
use crate::error::ModelError;

/// Tolerance when checking that probabilities lie in [0, 1]
const PROBABILITY_TOLERANCE: f32 = 1e-4;

/// Predicted speaker confidence class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    /// Class index 0
    #[serde(rename = "non confident")]
    NonConfident,
    /// Class index 1
    #[serde(rename = "confident")]
    Confident,
}

impl ConfidenceLabel {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ConfidenceLabel::NonConfident),
            1 => Some(ConfidenceLabel::Confident),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ConfidenceLabel::NonConfident => 0,
            ConfidenceLabel::Confident => 1,
        }
    }

    /// Display text ("non confident" / "confident")
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLabel::NonConfident => "non confident",
            ConfidenceLabel::Confident => "confident",
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the model's raw output should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOutput {
    /// Final layer already applies softmax
    #[default]
    Probabilities,
    /// Raw scores; softmax is applied after inference
    Logits,
}

/// Prediction derived from one classifier call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class with the highest probability (first one on ties)
    pub label: ConfidenceLabel,
    /// Highest probability × 100, in [0, 100]
    pub percentage: f32,
    /// [non confident, confident]
    pub probabilities: [f32; 2],
    /// Input matrix was all padding (empty or silent clip)
    pub degenerate_input: bool,
}

impl Prediction {
    /// Derive label and percentage from a two-class distribution
    ///
    /// # Errors
    /// `ModelError::InvalidOutput` when a value is NaN/infinite or outside [0, 1]
    pub fn from_probabilities(
        probabilities: [f32; 2],
        degenerate_input: bool,
    ) -> Result<Self, ModelError> {
        for (i, &p) in probabilities.iter().enumerate() {
            if !p.is_finite() {
                return Err(ModelError::InvalidOutput {
                    reason: format!("probability {} is {}", i, p),
                });
            }
            if !(-PROBABILITY_TOLERANCE..=1.0 + PROBABILITY_TOLERANCE).contains(&p) {
                return Err(ModelError::InvalidOutput {
                    reason: format!("probability {} = {} outside [0, 1]", i, p),
                });
            }
        }

        // Ties resolve to the first class, like argmax
        let index = if probabilities[1] > probabilities[0] { 1 } else { 0 };
        let label = ConfidenceLabel::from_index(index).unwrap_or(ConfidenceLabel::NonConfident);
        let percentage = (probabilities[index] * 100.0).clamp(0.0, 100.0);

        Ok(Self {
            label,
            percentage,
            probabilities,
            degenerate_input,
        })
    }
}

/// Model input tensor: flat data plus (batch, mels, frames, channel) dims
///
/// Row-major mel × frame data with a trailing singleton channel is already
/// in NHWC order, so no reordering happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub data: Vec<f32>,
    pub dims: [usize; 4],
}

impl ModelInput {
    pub fn from_features(features: &FeatureMatrix) -> Self {
        let (n_mels, n_frames) = features.shape();
        Self {
            data: features.as_slice().to_vec(),
            dims: [1, n_mels, n_frames, 1],
        }
    }
}

/// A pre-trained two-class model
///
/// Implementations must be immutable after loading so that one instance can
/// serve every request for the lifetime of the process.
pub trait ConfidenceModel: Send + Sync {
    /// Return [p(non confident), p(confident)] for one input
    fn predict(&self, input: &ModelInput) -> Result<[f32; 2], ModelError>;
}

/// Load the model described by the configuration
///
/// # Errors
/// `ModelError::BackendUnavailable` when built without the `onnx` feature,
/// `ModelError::LoadFailed` when no path is configured or loading fails
pub fn load_model(config: &ModelConfig) -> Result<Arc<dyn ConfidenceModel>, ModelError> {
    let path = config.path.as_ref().ok_or_else(|| ModelError::LoadFailed {
        reason: "no model path configured".to_string(),
    })?;

    #[cfg(feature = "onnx")]
    {
        let model = crate::analysis::onnx::OnnxModel::load(path, config.output)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    {
        log::warn!(
            "[Classifier] Cannot load {:?}: built without an inference backend",
            path
        );
        Err(ModelError::BackendUnavailable)
    }
}

/// Classifier runs a ConfidenceModel over feature matrices
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn ConfidenceModel>,
}

impl Classifier {
    /// Create a new Classifier around a loaded model
    pub fn new(model: Arc<dyn ConfidenceModel>) -> Self {
        Self { model }
    }

    /// Classify one feature matrix
    ///
    /// # Returns
    /// Prediction with label, percentage and the raw distribution
    pub fn classify(&self, features: &FeatureMatrix) -> Result<Prediction, ModelError> {
        let degenerate = features.is_degenerate();
        if degenerate {
            tracing::warn!("[Classifier] Input is all padding; prediction will be uninformative");
        }

        let input = ModelInput::from_features(features);
        let probabilities = self.model.predict(&input)?;
        let prediction = Prediction::from_probabilities(probabilities, degenerate)?;

        tracing::info!(
            label = %prediction.label,
            percentage = prediction.percentage,
            "[Classifier] Prediction ready"
        );

        Ok(prediction)
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
