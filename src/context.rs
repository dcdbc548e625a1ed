// AppContext: single owner of configuration, extractor and classifier
//
// Built once at startup and shared read-only afterwards. Every operation
// takes `&self`, so one context can serve the CLI, HTTP handlers and
// blocking worker threads at the same time.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::analysis::{load_model, Classifier, ConfidenceModel, MelExtractor, Prediction};
use crate::audio::{load_bytes, load_file, resample_mono, Recorder};
use crate::config::AppConfig;
use crate::error::{log_audio_error, log_model_error, PredictError};
use crate::questions::{self, INTERVIEW_QUESTIONS};

static GLOBAL_CONTEXT: OnceCell<AppContext> = OnceCell::new();

/// Result of answering one practice question
#[derive(Debug, Clone, Serialize)]
pub struct PracticeOutcome {
    pub number: usize,
    pub question: &'static str,
    pub prediction: Prediction,
    #[serde(skip)]
    pub samples: Vec<f32>,
}

/// Everything needed to go from audio to a Prediction
pub struct AppContext {
    config: AppConfig,
    extractor: MelExtractor,
    classifier: Classifier,
}

impl AppContext {
    /// Create a context around an already-loaded model
    ///
    /// # Errors
    /// Invalid configuration values (zero rate/frames, bad duration)
    pub fn new(config: AppConfig, model: Arc<dyn ConfidenceModel>) -> Result<Self, PredictError> {
        config.validate()?;
        let extractor = MelExtractor::new(config.audio.sample_rate)?;
        Ok(Self {
            config,
            extractor,
            classifier: Classifier::new(model),
        })
    }

    /// Create a context, loading the model named in the configuration
    pub fn from_config(config: AppConfig) -> Result<Self, PredictError> {
        let model = load_model(&config.model).map_err(|err| {
            log_model_error(&err, "AppContext::from_config");
            err
        })?;
        Self::new(config, model)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn extractor(&self) -> &MelExtractor {
        &self.extractor
    }

    /// Classify a mono waveform recorded at `sample_rate`
    ///
    /// Audio at any other rate than the configured analysis rate is
    /// resampled first.
    pub fn predict_samples(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Prediction, PredictError> {
        let target = self.config.audio.sample_rate;
        let features = if sample_rate == target {
            self.extractor
                .extract(samples, self.config.features.max_frames)?
        } else {
            let resampled = resample_mono(samples, sample_rate, target)?;
            self.extractor
                .extract(&resampled, self.config.features.max_frames)?
        };

        Ok(self.classifier.classify(&features)?)
    }

    /// Decode an audio file and classify it
    pub fn predict_file<P: AsRef<Path>>(&self, path: P) -> Result<Prediction, PredictError> {
        let samples = load_file(path.as_ref(), self.config.audio.sample_rate).map_err(|err| {
            log_audio_error(&err, "AppContext::predict_file");
            err
        })?;
        self.predict_samples(&samples, self.config.audio.sample_rate)
    }

    /// Decode uploaded bytes and classify them
    ///
    /// # Arguments
    /// * `bytes` - Complete file contents
    /// * `extension` - Optional container hint, e.g. "wav" or "mp3"
    pub fn predict_bytes(
        &self,
        bytes: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<Prediction, PredictError> {
        let samples =
            load_bytes(bytes, extension, self.config.audio.sample_rate).map_err(|err| {
                log_audio_error(&err, "AppContext::predict_bytes");
                err
            })?;
        self.predict_samples(&samples, self.config.audio.sample_rate)
    }

    /// Record from the microphone at the analysis rate
    ///
    /// # Arguments
    /// * `seconds` - Override for the configured recording length
    pub fn record(&self, seconds: Option<f32>) -> Result<Vec<f32>, PredictError> {
        let seconds = seconds.unwrap_or(self.config.audio.record_seconds);
        let recorder = Recorder::new(seconds, self.config.audio.sample_rate)?;
        recorder.record().map_err(|err| {
            log_audio_error(&err, "AppContext::record");
            err.into()
        })
    }

    /// Record, then classify the recording
    ///
    /// # Returns
    /// The recorded clip (for saving) and its prediction
    pub fn record_and_predict(
        &self,
        seconds: Option<f32>,
    ) -> Result<(Vec<f32>, Prediction), PredictError> {
        let samples = self.record(seconds)?;
        let prediction = self.predict_samples(&samples, self.config.audio.sample_rate)?;
        Ok((samples, prediction))
    }

    /// Show a question, record an answer and classify it
    pub fn practice(
        &self,
        number: usize,
        seconds: Option<f32>,
    ) -> Result<PracticeOutcome, PredictError> {
        let question = question_or_err(number)?;
        log::info!("[AppContext] Practice question {}: {}", number, question);
        let (samples, prediction) = self.record_and_predict(seconds)?;
        Ok(PracticeOutcome {
            number,
            question,
            prediction,
            samples,
        })
    }
}

/// Look up a 1-based question number
pub fn question_or_err(number: usize) -> Result<&'static str, PredictError> {
    questions::question(number).ok_or(PredictError::InvalidQuestion {
        number,
        available: INTERVIEW_QUESTIONS.len(),
    })
}

/// Install the process-wide context
///
/// # Errors
/// `PredictError::AlreadyInitialized` if a context was installed before
pub fn install(context: AppContext) -> Result<&'static AppContext, PredictError> {
    GLOBAL_CONTEXT
        .set(context)
        .map_err(|_| PredictError::AlreadyInitialized)?;
    global()
}

/// Access the process-wide context
///
/// # Errors
/// `PredictError::NotInitialized` before `install`
pub fn global() -> Result<&'static AppContext, PredictError> {
    GLOBAL_CONTEXT.get().ok_or(PredictError::NotInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ConfidenceLabel, ModelInput};
    use crate::error::{AudioError, FeatureError, ModelError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        calls: AtomicUsize,
        output: [f32; 2],
    }

    impl ConfidenceModel for CountingModel {
        fn predict(&self, input: &ModelInput) -> Result<[f32; 2], ModelError> {
            assert_eq!(input.dims, [1, 128, 216, 1]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output)
        }
    }

    fn make_context(output: [f32; 2]) -> (AppContext, Arc<CountingModel>) {
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
            output,
        });
        let ctx = AppContext::new(AppConfig::default(), model.clone()).unwrap();
        (ctx, model)
    }

    fn tone(rate: u32, seconds: f32) -> Vec<f32> {
        let n = (rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_predict_samples_at_analysis_rate() {
        let (ctx, model) = make_context([0.2, 0.8]);
        let prediction = ctx.predict_samples(&tone(22050, 1.0), 22050).unwrap();

        assert_eq!(prediction.label, ConfidenceLabel::Confident);
        assert!((prediction.percentage - 80.0).abs() < 1e-4);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_predict_samples_resamples_foreign_rate() {
        let (ctx, _model) = make_context([0.9, 0.1]);
        let prediction = ctx.predict_samples(&tone(44100, 1.0), 44100).unwrap();
        assert_eq!(prediction.label, ConfidenceLabel::NonConfident);
        assert!(!prediction.degenerate_input);
    }

    #[test]
    fn test_empty_clip_is_degenerate_not_error() {
        let (ctx, _model) = make_context([0.5, 0.5]);
        let prediction = ctx.predict_samples(&[], 22050).unwrap();
        assert!(prediction.degenerate_input);
        assert_eq!(prediction.label, ConfidenceLabel::NonConfident);
    }

    #[test]
    fn test_zero_rate_rejected() {
        let (ctx, model) = make_context([0.5, 0.5]);
        let err = ctx.predict_samples(&[0.1; 100], 0).unwrap_err();
        assert_eq!(
            err,
            PredictError::Audio(AudioError::InvalidSampleRate { sample_rate: 0 })
        );
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.features.max_frames = 0;
        let model = Arc::new(CountingModel {
            calls: AtomicUsize::new(0),
            output: [0.5, 0.5],
        });
        assert!(matches!(
            AppContext::new(config, model),
            Err(PredictError::Feature(FeatureError::InvalidFrameCount { .. }))
        ));
    }

    #[test]
    fn test_predict_file_roundtrip() {
        let (ctx, _model) = make_context([0.3, 0.7]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.wav");
        crate::audio::write_wav(&path, &tone(22050, 2.0), 22050).unwrap();

        let prediction = ctx.predict_file(&path).unwrap();
        assert_eq!(prediction.label, ConfidenceLabel::Confident);
    }

    #[test]
    fn test_predict_bytes_rejects_garbage() {
        let (ctx, _model) = make_context([0.3, 0.7]);
        let err = ctx.predict_bytes(b"not audio at all".to_vec(), None).unwrap_err();
        assert!(matches!(err, PredictError::Audio(AudioError::DecodeFailed { .. })));
    }

    #[test]
    fn test_practice_rejects_unknown_question() {
        let (ctx, _model) = make_context([0.3, 0.7]);
        assert_eq!(
            ctx.practice(9, Some(1.0)).unwrap_err(),
            PredictError::InvalidQuestion {
                number: 9,
                available: 5
            }
        );
    }

    #[test]
    fn test_record_rejects_bad_duration() {
        let (ctx, _model) = make_context([0.3, 0.7]);
        assert!(matches!(
            ctx.record(Some(-2.0)),
            Err(PredictError::Audio(AudioError::InvalidDuration { .. }))
        ));
    }

    #[test]
    fn test_context_is_shareable_across_threads() {
        let (ctx, model) = make_context([0.4, 0.6]);
        let ctx = Arc::new(ctx);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ctx = ctx.clone();
                std::thread::spawn(move || ctx.predict_samples(&tone(22050, 0.5), 22050))
            })
            .collect();

        let predictions: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert!(predictions.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(model.calls.load(Ordering::SeqCst), 4);
    }
}
