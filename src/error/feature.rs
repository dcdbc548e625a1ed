// Feature extraction error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Feature error code constants
///
/// Error code range: 2001-2003
pub struct FeatureErrorCodes {}

impl FeatureErrorCodes {
    /// Sample rate must be greater than zero
    pub const INVALID_SAMPLE_RATE: i32 = 2001;

    /// Frame count must be greater than zero
    pub const INVALID_FRAME_COUNT: i32 = 2002;

    /// Waveform contains NaN or infinity
    pub const NON_FINITE_SAMPLE: i32 = 2003;
}

/// Invalid parameters handed to the feature extractor
///
/// Empty or silent waveforms are not errors; they produce a degenerate but
/// well-shaped matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Sample rate must be > 0
    InvalidSampleRate { sample_rate: u32 },

    /// max_frames must be > 0
    InvalidFrameCount { max_frames: usize },

    /// First NaN/infinite sample in the waveform
    NonFiniteSample { index: usize },
}

impl ErrorCode for FeatureError {
    fn code(&self) -> i32 {
        match self {
            FeatureError::InvalidSampleRate { .. } => FeatureErrorCodes::INVALID_SAMPLE_RATE,
            FeatureError::InvalidFrameCount { .. } => FeatureErrorCodes::INVALID_FRAME_COUNT,
            FeatureError::NonFiniteSample { .. } => FeatureErrorCodes::NON_FINITE_SAMPLE,
        }
    }

    fn message(&self) -> String {
        match self {
            FeatureError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            FeatureError::InvalidFrameCount { max_frames } => {
                format!("Frame count must be greater than 0 (got {})", max_frames)
            }
            FeatureError::NonFiniteSample { index } => {
                format!("Waveform contains a non-finite sample at index {}", index)
            }
        }
    }
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeatureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FeatureError {}
