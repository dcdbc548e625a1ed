// ONNX backend - runs the exported Keras classifier with candle
//
// The Keras model (.h5) is converted to ONNX once (e.g. with tf2onnx); the
// graph keeps the NHWC input layout (batch, mels, frames, channel).

use std::collections::HashMap;
use std::path::Path;

use candle_core::{Device, Tensor};

use crate::analysis::classifier::{ConfidenceModel, ModelInput, ModelOutput};
use crate::error::ModelError;

/// Pre-trained classifier loaded from an ONNX file
pub struct OnnxModel {
    model: candle_onnx::onnx::ModelProto,
    input_name: String,
    output_name: String,
    output: ModelOutput,
}

impl OnnxModel {
    /// Load and inspect an ONNX graph
    ///
    /// The first graph input that is not an initializer receives the
    /// features; the first graph output is read as the class distribution.
    pub fn load<P: AsRef<Path>>(path: P, output: ModelOutput) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let model = candle_onnx::read_file(path).map_err(|err| ModelError::LoadFailed {
            reason: format!("{}: {}", path.display(), err),
        })?;

        let graph = model.graph.as_ref().ok_or_else(|| ModelError::LoadFailed {
            reason: format!("{} has no graph", path.display()),
        })?;

        let input_name = graph
            .input
            .iter()
            .map(|input| input.name.clone())
            .find(|name| !graph.initializer.iter().any(|init| &init.name == name))
            .ok_or_else(|| ModelError::LoadFailed {
                reason: "graph has no free input".to_string(),
            })?;

        let output_name = graph
            .output
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| ModelError::LoadFailed {
                reason: "graph has no output".to_string(),
            })?;

        log::info!(
            "[OnnxModel] Loaded {} (input={}, output={})",
            path.display(),
            input_name,
            output_name
        );

        Ok(Self {
            model,
            input_name,
            output_name,
            output,
        })
    }
}

fn inference_error(err: candle_core::Error) -> ModelError {
    ModelError::InferenceFailed {
        reason: err.to_string(),
    }
}

impl ConfidenceModel for OnnxModel {
    fn predict(&self, input: &ModelInput) -> Result<[f32; 2], ModelError> {
        let [batch, mels, frames, channels] = input.dims;
        let tensor = Tensor::from_slice(&input.data, (batch, mels, frames, channels), &Device::Cpu)
            .map_err(inference_error)?;

        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.clone(), tensor);

        let mut outputs =
            candle_onnx::simple_eval(&self.model, inputs).map_err(inference_error)?;
        let scores = outputs
            .remove(&self.output_name)
            .ok_or_else(|| ModelError::InvalidOutput {
                reason: format!("missing output {}", self.output_name),
            })?;

        let scores = match self.output {
            ModelOutput::Probabilities => scores,
            ModelOutput::Logits => {
                candle_nn::ops::softmax_last_dim(&scores).map_err(inference_error)?
            }
        };

        let values = scores
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference_error)?;

        match values.as_slice() {
            [non_confident, confident] => Ok([*non_confident, *confident]),
            other => Err(ModelError::InvalidOutput {
                reason: format!("expected 2 values, got {}", other.len()),
            }),
        }
    }
}
