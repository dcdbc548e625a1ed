//! Configuration management
//!
//! Runtime configuration is loaded from a JSON file so the model location
//! and recording length can change without recompiling. The feature
//! analysis parameters are deliberately absent: they are fixed by the
//! trained classifier and live as constants in `analysis::features`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::features::DEFAULT_MAX_FRAMES;
use crate::analysis::ModelOutput;
use crate::audio::capture::MAX_RECORD_SECONDS;
use crate::error::{AudioError, FeatureError, PredictError};

/// Default location of the optional config file
pub const DEFAULT_CONFIG_PATH: &str = "assets/config.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub features: FeatureConfig,
    pub model: ModelConfig,
}

/// Audio source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Rate every waveform is converted to before analysis
    pub sample_rate: u32,
    /// Length of a microphone recording in seconds
    pub record_seconds: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            record_seconds: 10.0,
        }
    }
}

/// Feature matrix configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Time frames in the classifier input (must match the model)
    pub max_frames: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX export of the trained classifier
    pub path: Option<PathBuf>,
    /// Whether the graph ends in softmax or emits raw scores
    pub output: ModelOutput,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("assets/speech_confidence_model.onnx")),
            output: ModelOutput::Probabilities,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// Loaded configuration; if the file doesn't exist or the JSON is
    /// invalid, the defaults are returned and a warning is logged.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Reject values that can never produce a prediction
    pub fn validate(&self) -> Result<(), PredictError> {
        if self.audio.sample_rate == 0 {
            return Err(FeatureError::InvalidSampleRate {
                sample_rate: self.audio.sample_rate,
            }
            .into());
        }
        if self.features.max_frames == 0 {
            return Err(FeatureError::InvalidFrameCount {
                max_frames: self.features.max_frames,
            }
            .into());
        }
        let seconds = self.audio.record_seconds;
        if !(seconds > 0.0 && seconds <= MAX_RECORD_SECONDS) {
            return Err(AudioError::InvalidDuration {
                seconds: self.audio.record_seconds,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.audio.record_seconds, 10.0);
        assert_eq!(config.features.max_frames, 216);
        assert_eq!(config.model.output, ModelOutput::Probabilities);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{ "audio": { "record_seconds": 5.0 }, "model": { "output": "logits" } }"#)
                .unwrap();
        assert_eq!(parsed.audio.record_seconds, 5.0);
        assert_eq!(parsed.audio.sample_rate, 22050);
        assert_eq!(parsed.features.max_frames, 216);
        assert_eq!(parsed.model.output, ModelOutput::Logits);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/speech_confidence.json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_json_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "features": {{ "max_frames": 100 }} }}"#).unwrap();
        let config = AppConfig::load_from_file(file.path());
        assert_eq!(config.features.max_frames, 100);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.audio.sample_rate = 0;
        assert!(matches!(
            config.validate(),
            Err(PredictError::Feature(FeatureError::InvalidSampleRate { .. }))
        ));

        let mut config = AppConfig::default();
        config.features.max_frames = 0;
        assert!(matches!(
            config.validate(),
            Err(PredictError::Feature(FeatureError::InvalidFrameCount { .. }))
        ));

        let mut config = AppConfig::default();
        config.audio.record_seconds = -1.0;
        assert!(matches!(
            config.validate(),
            Err(PredictError::Audio(AudioError::InvalidDuration { .. }))
        ));

        let mut config = AppConfig::default();
        config.audio.record_seconds = 1e30;
        assert!(matches!(
            config.validate(),
            Err(PredictError::Audio(AudioError::InvalidDuration { .. }))
        ));
    }
}
