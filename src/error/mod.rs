// Error types for the speech confidence pipeline
//
// Each stage (audio source, feature extraction, classifier) has its own
// error enum with numeric codes. PredictError wraps them so callers can
// render a distinct message per failure category.

mod audio;
mod feature;
mod model;

use std::fmt;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use feature::{FeatureError, FeatureErrorCodes};
pub use model::{log_model_error, ModelError, ModelErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the CLI and HTTP surfaces.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Broad failure category, used to pick user-facing wording and HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller passed a parameter that can never work
    InvalidParameter,
    /// Microphone capture failed
    Capture,
    /// Uploaded or stored audio could not be read
    Decode,
    /// Model loading or inference failed
    Model,
    /// Application context used before/after its single initialization
    Lifecycle,
}

/// Lifecycle error code range: 4001-4003
pub struct PredictErrorCodes {}

impl PredictErrorCodes {
    pub const ALREADY_INITIALIZED: i32 = 4001;
    pub const NOT_INITIALIZED: i32 = 4002;
    pub const INVALID_QUESTION: i32 = 4003;
}

/// Any failure on the path from audio to prediction
#[derive(Debug, Clone, PartialEq)]
pub enum PredictError {
    Feature(FeatureError),
    Audio(AudioError),
    Model(ModelError),
    /// Global context installed twice
    AlreadyInitialized,
    /// Global context read before install
    NotInitialized,
    /// Interview question number out of range (1-based)
    InvalidQuestion { number: usize, available: usize },
}

impl PredictError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::Feature(_) => ErrorKind::InvalidParameter,
            PredictError::InvalidQuestion { .. } => ErrorKind::InvalidParameter,
            PredictError::Audio(err) if err.is_invalid_parameter() => ErrorKind::InvalidParameter,
            PredictError::Audio(err) if err.is_decode() => ErrorKind::Decode,
            PredictError::Audio(_) => ErrorKind::Capture,
            PredictError::Model(_) => ErrorKind::Model,
            PredictError::AlreadyInitialized | PredictError::NotInitialized => {
                ErrorKind::Lifecycle
            }
        }
    }

    /// Short, category-specific headline for display
    pub fn headline(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidParameter => "Invalid input",
            ErrorKind::Capture => "An error occurred during recording",
            ErrorKind::Decode => "An error occurred while reading the audio file",
            ErrorKind::Model => "An error occurred during prediction",
            ErrorKind::Lifecycle => "Application not ready",
        }
    }
}

impl ErrorCode for PredictError {
    fn code(&self) -> i32 {
        match self {
            PredictError::Feature(err) => err.code(),
            PredictError::Audio(err) => err.code(),
            PredictError::Model(err) => err.code(),
            PredictError::AlreadyInitialized => PredictErrorCodes::ALREADY_INITIALIZED,
            PredictError::NotInitialized => PredictErrorCodes::NOT_INITIALIZED,
            PredictError::InvalidQuestion { .. } => PredictErrorCodes::INVALID_QUESTION,
        }
    }

    fn message(&self) -> String {
        match self {
            PredictError::Feature(err) => err.message(),
            PredictError::Audio(err) => err.message(),
            PredictError::Model(err) => err.message(),
            PredictError::AlreadyInitialized => "Application context already initialized".to_string(),
            PredictError::NotInitialized => "Application context not initialized".to_string(),
            PredictError::InvalidQuestion { number, available } => {
                format!("Question {} does not exist (choose 1-{})", number, available)
            }
        }
    }
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {}): {}", self.headline(), self.code(), self.message())
    }
}

impl std::error::Error for PredictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PredictError::Feature(err) => Some(err),
            PredictError::Audio(err) => Some(err),
            PredictError::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FeatureError> for PredictError {
    fn from(err: FeatureError) -> Self {
        PredictError::Feature(err)
    }
}

impl From<AudioError> for PredictError {
    fn from(err: AudioError) -> Self {
        PredictError::Audio(err)
    }
}

impl From<ModelError> for PredictError {
    fn from(err: ModelError) -> Self {
        PredictError::Model(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: PredictError = FeatureError::InvalidSampleRate { sample_rate: 0 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err: PredictError = AudioError::NoAudioCaptured.into();
        assert_eq!(err.kind(), ErrorKind::Capture);

        let err: PredictError = AudioError::DecodeFailed {
            reason: "x".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err: PredictError = AudioError::InvalidDuration { seconds: 0.0 }.into();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        let err: PredictError = ModelError::BackendUnavailable.into();
        assert_eq!(err.kind(), ErrorKind::Model);

        assert_eq!(PredictError::NotInitialized.kind(), ErrorKind::Lifecycle);
    }

    #[test]
    fn test_codes_delegate_to_inner_error() {
        let err: PredictError = ModelError::BackendUnavailable.into();
        assert_eq!(err.code(), 3004);

        let err = PredictError::InvalidQuestion {
            number: 9,
            available: 5,
        };
        assert_eq!(err.code(), 4003);
        assert!(err.message().contains("1-5"));
    }

    #[test]
    fn test_headlines_differ_per_category() {
        let capture: PredictError = AudioError::NoAudioCaptured.into();
        let decode: PredictError = AudioError::DecodeFailed {
            reason: "x".to_string(),
        }
        .into();
        let model: PredictError = ModelError::BackendUnavailable.into();
        assert_ne!(capture.headline(), decode.headline());
        assert_ne!(decode.headline(), model.headline());
        assert!(format!("{}", capture).starts_with("An error occurred during recording"));
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), FeatureError> {
            Err(FeatureError::InvalidFrameCount { max_frames: 0 })
        }

        fn caller() -> Result<(), PredictError> {
            may_fail()?;
            Ok(())
        }

        assert!(matches!(caller(), Err(PredictError::Feature(_))));
    }

    #[test]
    fn test_error_code_trait() {
        let err: &dyn ErrorCode = &AudioError::NoAudioCaptured;
        assert_eq!(err.code(), 1003);
    }
}
