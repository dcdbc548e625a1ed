// Analysis module - feature extraction and confidence classification
//
// Pipeline: waveform → MelExtractor → FeatureMatrix → Classifier → Prediction
//
// Both stages are stateless per call: the extractor only reads its
// precomputed tables and the classifier only reads its loaded model.

pub mod classifier;
pub mod features;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use classifier::{
    load_model, Classifier, ConfidenceLabel, ConfidenceModel, ModelInput, ModelOutput, Prediction,
};
pub use features::{extract_features, FeatureMatrix, MelExtractor, DEFAULT_MAX_FRAMES, N_MELS};
