// Audio error types and constants

use crate::audio::capture::MAX_RECORD_SECONDS;
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Single source of truth for the numeric codes reported by the CLI and the
/// HTTP API.
///
/// Error code range: 1001-1008
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Failed to open or configure the input stream
    pub const STREAM_OPEN_FAILED: i32 = 1001;

    /// Capture device failed while running
    pub const HARDWARE_ERROR: i32 = 1002;

    /// Recording finished without a single sample
    pub const NO_AUDIO_CAPTURED: i32 = 1003;

    /// Audio file could not be probed or decoded
    pub const DECODE_FAILED: i32 = 1004;

    /// Sample rate conversion failed
    pub const RESAMPLE_FAILED: i32 = 1005;

    /// Sample rate of zero handed to an audio routine
    pub const INVALID_SAMPLE_RATE: i32 = 1006;

    /// Recording duration is outside (0, MAX_RECORD_SECONDS]
    pub const INVALID_DURATION: i32 = 1007;

    /// WAV file could not be read or written
    pub const FILE_IO: i32 = 1008;
}

/// Log an audio error with structured context
///
/// This function logs audio errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=AudioSource, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Audio source errors
///
/// These errors cover microphone capture, file decoding and resampling,
/// everything that happens before a waveform reaches feature extraction.
///
/// Error code range: 1001-1008
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Failed to open audio stream
    StreamOpenFailed { reason: String },

    /// Hardware error occurred
    HardwareError { details: String },

    /// No samples arrived during the recording window
    NoAudioCaptured,

    /// Audio file could not be decoded
    DecodeFailed { reason: String },

    /// Resampler could not be built or run
    ResampleFailed { reason: String },

    /// Sample rate must be > 0
    InvalidSampleRate { sample_rate: u32 },

    /// Duration must be finite and > 0 seconds
    InvalidDuration { seconds: f32 },

    /// WAV read/write failed
    FileIo { reason: String },
}

impl AudioError {
    /// True for errors raised while reading an uploaded/stored file
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            AudioError::DecodeFailed { .. } | AudioError::FileIo { .. }
        )
    }

    /// True for invalid caller-supplied parameters
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            AudioError::InvalidSampleRate { .. } | AudioError::InvalidDuration { .. }
        )
    }
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::StreamOpenFailed { .. } => AudioErrorCodes::STREAM_OPEN_FAILED,
            AudioError::HardwareError { .. } => AudioErrorCodes::HARDWARE_ERROR,
            AudioError::NoAudioCaptured => AudioErrorCodes::NO_AUDIO_CAPTURED,
            AudioError::DecodeFailed { .. } => AudioErrorCodes::DECODE_FAILED,
            AudioError::ResampleFailed { .. } => AudioErrorCodes::RESAMPLE_FAILED,
            AudioError::InvalidSampleRate { .. } => AudioErrorCodes::INVALID_SAMPLE_RATE,
            AudioError::InvalidDuration { .. } => AudioErrorCodes::INVALID_DURATION,
            AudioError::FileIo { .. } => AudioErrorCodes::FILE_IO,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::StreamOpenFailed { reason } => {
                format!("Failed to open audio stream: {}", reason)
            }
            AudioError::HardwareError { details } => {
                format!("Hardware error: {}", details)
            }
            AudioError::NoAudioCaptured => {
                "No audio captured. Check that a microphone is connected.".to_string()
            }
            AudioError::DecodeFailed { reason } => {
                format!("Could not decode audio: {}", reason)
            }
            AudioError::ResampleFailed { reason } => {
                format!("Resampling failed: {}", reason)
            }
            AudioError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            AudioError::InvalidDuration { seconds } => {
                format!(
                    "Recording duration must be between 0 and {} seconds (got {} s)",
                    MAX_RECORD_SECONDS, seconds
                )
            }
            AudioError::FileIo { reason } => {
                format!("Audio file I/O failed: {}", reason)
            }
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::FileIo {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_codes() {
        assert_eq!(
            AudioError::StreamOpenFailed {
                reason: "test".to_string()
            }
            .code(),
            1001
        );
        assert_eq!(
            AudioError::HardwareError {
                details: "test".to_string()
            }
            .code(),
            1002
        );
        assert_eq!(AudioError::NoAudioCaptured.code(), 1003);
        assert_eq!(
            AudioError::DecodeFailed {
                reason: "test".to_string()
            }
            .code(),
            1004
        );
        assert_eq!(
            AudioError::ResampleFailed {
                reason: "test".to_string()
            }
            .code(),
            1005
        );
        assert_eq!(AudioError::InvalidSampleRate { sample_rate: 0 }.code(), 1006);
        assert_eq!(AudioError::InvalidDuration { seconds: 0.0 }.code(), 1007);
        assert_eq!(
            AudioError::FileIo {
                reason: "test".to_string()
            }
            .code(),
            1008
        );
    }

    #[test]
    fn test_audio_error_messages() {
        let err = AudioError::InvalidSampleRate { sample_rate: 0 };
        assert_eq!(err.message(), "Sample rate must be greater than 0 (got 0)");

        let err = AudioError::DecodeFailed {
            reason: "bad header".to_string(),
        };
        assert!(err.message().contains("bad header"));

        let err = AudioError::NoAudioCaptured;
        assert!(err.message().contains("microphone"));
    }

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::NoAudioCaptured;
        let display = format!("{}", err);
        assert!(display.contains("AudioError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_error_categories() {
        assert!(AudioError::DecodeFailed {
            reason: String::new()
        }
        .is_decode());
        assert!(AudioError::InvalidDuration { seconds: -1.0 }.is_invalid_parameter());
        assert!(!AudioError::NoAudioCaptured.is_decode());
        assert!(!AudioError::NoAudioCaptured.is_invalid_parameter());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::other("test io error");
        let audio_err: AudioError = io_err.into();
        match audio_err {
            AudioError::FileIo { reason } => {
                assert!(reason.contains("test io error"));
            }
            _ => panic!("Expected FileIo"),
        }
    }
}
