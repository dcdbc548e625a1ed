// Classifier error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Model error code constants
///
/// Error code range: 3001-3004
pub struct ModelErrorCodes {}

impl ModelErrorCodes {
    /// Model file missing or unreadable
    pub const LOAD_FAILED: i32 = 3001;

    /// Inference call failed
    pub const INFERENCE_FAILED: i32 = 3002;

    /// Model returned something other than two finite probabilities
    pub const INVALID_OUTPUT: i32 = 3003;

    /// Crate built without an inference backend
    pub const BACKEND_UNAVAILABLE: i32 = 3004;
}

/// Log a model error with structured context
pub fn log_model_error(err: &ModelError, context: &str) {
    error!(
        "Model error in {}: code={}, component=Classifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Classifier errors
///
/// Error code range: 3001-3004
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Model could not be loaded
    LoadFailed { reason: String },

    /// Model evaluation failed
    InferenceFailed { reason: String },

    /// Output is not a usable two-class distribution
    InvalidOutput { reason: String },

    /// No backend compiled in (enable the `onnx` feature)
    BackendUnavailable,
}

impl ErrorCode for ModelError {
    fn code(&self) -> i32 {
        match self {
            ModelError::LoadFailed { .. } => ModelErrorCodes::LOAD_FAILED,
            ModelError::InferenceFailed { .. } => ModelErrorCodes::INFERENCE_FAILED,
            ModelError::InvalidOutput { .. } => ModelErrorCodes::INVALID_OUTPUT,
            ModelError::BackendUnavailable => ModelErrorCodes::BACKEND_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            ModelError::LoadFailed { reason } => format!("Failed to load model: {}", reason),
            ModelError::InferenceFailed { reason } => format!("Inference failed: {}", reason),
            ModelError::InvalidOutput { reason } => {
                format!("Model output is not a valid distribution: {}", reason)
            }
            ModelError::BackendUnavailable => {
                "No inference backend available. Rebuild with --features onnx.".to_string()
            }
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModelError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ModelError {}
