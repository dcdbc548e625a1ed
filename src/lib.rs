// Speech Confidence - classify how confident a spoken answer sounds
//
// Pipeline: audio source → log-mel features → pre-trained classifier →
// label + confidence percentage.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod questions;

pub use analysis::{
    extract_features, Classifier, ConfidenceLabel, ConfidenceModel, FeatureMatrix, MelExtractor,
    ModelInput, Prediction,
};
pub use config::AppConfig;
pub use context::{AppContext, PracticeOutcome};
pub use error::{AudioError, ErrorCode, FeatureError, ModelError, PredictError};

use tracing_subscriber::EnvFilter;

/// Initialize logging for binaries
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
