use super::*;
use crate::analysis::features::{extract_features, DEFAULT_MAX_FRAMES, N_MELS};
use std::sync::Mutex;

/// Model returning a fixed distribution and remembering the last input dims
struct FixedModel {
    output: [f32; 2],
    last_dims: Mutex<Option<[usize; 4]>>,
}

impl FixedModel {
    fn new(output: [f32; 2]) -> Self {
        Self {
            output,
            last_dims: Mutex::new(None),
        }
    }
}

impl ConfidenceModel for FixedModel {
    fn predict(&self, input: &ModelInput) -> Result<[f32; 2], ModelError> {
        *self.last_dims.lock().unwrap() = Some(input.dims);
        Ok(self.output)
    }
}

/// Helper to create a real feature matrix from a short tone
fn tone_features() -> FeatureMatrix {
    let signal: Vec<f32> = (0..22050)
        .map(|i| (2.0 * std::f32::consts::PI * 300.0 * i as f32 / 22050.0).sin())
        .collect();
    extract_features(&signal, 22050, DEFAULT_MAX_FRAMES).unwrap()
}

#[test]
fn test_label_indices() {
    assert_eq!(ConfidenceLabel::from_index(0), Some(ConfidenceLabel::NonConfident));
    assert_eq!(ConfidenceLabel::from_index(1), Some(ConfidenceLabel::Confident));
    assert_eq!(ConfidenceLabel::from_index(2), None);
    assert_eq!(ConfidenceLabel::Confident.index(), 1);
    assert_eq!(ConfidenceLabel::NonConfident.to_string(), "non confident");
    assert_eq!(ConfidenceLabel::Confident.to_string(), "confident");
}

#[test]
fn test_prediction_takes_argmax() {
    let prediction = Prediction::from_probabilities([0.25, 0.75], false).unwrap();
    assert_eq!(prediction.label, ConfidenceLabel::Confident);
    assert!((prediction.percentage - 75.0).abs() < 1e-4);

    let prediction = Prediction::from_probabilities([0.9, 0.1], false).unwrap();
    assert_eq!(prediction.label, ConfidenceLabel::NonConfident);
    assert!((prediction.percentage - 90.0).abs() < 1e-4);
}

#[test]
fn test_prediction_tie_goes_to_first_class() {
    let prediction = Prediction::from_probabilities([0.5, 0.5], true).unwrap();
    assert_eq!(prediction.label, ConfidenceLabel::NonConfident);
    assert_eq!(prediction.percentage, 50.0);
    assert!(prediction.degenerate_input);
}

#[test]
fn test_prediction_rejects_invalid_output() {
    assert!(matches!(
        Prediction::from_probabilities([f32::NAN, 0.5], false),
        Err(ModelError::InvalidOutput { .. })
    ));
    assert!(matches!(
        Prediction::from_probabilities([-2.0, 3.0], false),
        Err(ModelError::InvalidOutput { .. })
    ));
}

#[test]
fn test_model_input_layout() {
    let features = tone_features();
    let input = ModelInput::from_features(&features);
    assert_eq!(input.dims, [1, N_MELS, DEFAULT_MAX_FRAMES, 1]);
    assert_eq!(input.data.len(), N_MELS * DEFAULT_MAX_FRAMES);
    // NHWC index of (mel 3, frame 5) == row-major matrix index
    assert_eq!(input.data[3 * DEFAULT_MAX_FRAMES + 5], features.get(3, 5).unwrap());
}

#[test]
fn test_classify_passes_batched_input() {
    let model = Arc::new(FixedModel::new([0.3, 0.7]));
    let classifier = Classifier::new(model.clone());

    let prediction = classifier.classify(&tone_features()).unwrap();
    assert_eq!(prediction.label, ConfidenceLabel::Confident);
    assert!(!prediction.degenerate_input);
    assert_eq!(
        *model.last_dims.lock().unwrap(),
        Some([1, N_MELS, DEFAULT_MAX_FRAMES, 1])
    );
}

#[test]
fn test_classify_flags_degenerate_input() {
    let classifier = Classifier::new(Arc::new(FixedModel::new([0.6, 0.4])));
    let silence = extract_features(&[], 22050, DEFAULT_MAX_FRAMES).unwrap();

    let prediction = classifier.classify(&silence).unwrap();
    assert!(prediction.degenerate_input);
    assert_eq!(prediction.label, ConfidenceLabel::NonConfident);
}

#[test]
fn test_prediction_label_serializes_like_display() {
    let prediction = Prediction::from_probabilities([0.2, 0.8], false).unwrap();
    let json = serde_json::to_value(prediction).unwrap();
    assert_eq!(json["label"], "confident");

    let prediction = Prediction::from_probabilities([0.8, 0.2], false).unwrap();
    let json = serde_json::to_value(prediction).unwrap();
    assert_eq!(json["label"], "non confident");
    assert_eq!(json["label"], prediction.label.to_string());

    let parsed: ConfidenceLabel = serde_json::from_str("\"non confident\"").unwrap();
    assert_eq!(parsed, ConfidenceLabel::NonConfident);
}

#[cfg(not(feature = "onnx"))]
#[test]
fn test_load_model_without_backend() {
    let config = ModelConfig::default();
    assert_eq!(load_model(&config).err(), Some(ModelError::BackendUnavailable));
}

#[test]
fn test_load_model_requires_path() {
    let config = ModelConfig {
        path: None,
        ..ModelConfig::default()
    };
    assert!(matches!(
        load_model(&config),
        Err(ModelError::LoadFailed { .. })
    ));
}
