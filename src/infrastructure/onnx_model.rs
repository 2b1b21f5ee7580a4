use crate::domain::errors::{ForecastError, ModelLoadError};
use crate::domain::ports::ForecastModel;
use ort::session::Session;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Sequence model exported to ONNX, taking a `[1, look_back, 1]` f32 tensor
/// and returning the next normalized value.
pub struct OnnxForecastModel {
    session: Mutex<Session>,
    model_path: PathBuf,
    look_back: usize,
}

impl OnnxForecastModel {
    /// Load the model and run one probe inference so a shape mismatch fails
    /// at startup rather than on the first request.
    pub fn load(model_path: &Path, look_back: usize) -> Result<Self, ModelLoadError> {
        if !model_path.exists() {
            return Err(ModelLoadError::Missing {
                path: model_path.to_path_buf(),
            });
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Runtime(format!("Failed to create session builder: {}", e)))?
            // Single-threaded for determinism
            .with_intra_threads(1)
            .map_err(|e| ModelLoadError::Runtime(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::Corrupt {
                path: model_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let model = Self {
            session: Mutex::new(session),
            model_path: model_path.to_path_buf(),
            look_back,
        };

        model
            .infer(&vec![0.0; look_back])
            .map_err(|e| ModelLoadError::IncompatibleShape {
                reason: format!(
                    "probe inference with input shape [1, {}, 1] failed: {}",
                    look_back, e
                ),
            })?;

        info!(
            "Successfully loaded ONNX model from {:?} (look_back={})",
            model.model_path, look_back
        );
        Ok(model)
    }
}

impl ForecastModel for OnnxForecastModel {
    fn look_back(&self) -> usize {
        self.look_back
    }

    fn infer(&self, window: &[f64]) -> Result<f64, ForecastError> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| ForecastError::inference(format!("Session lock failed: {}", e)))?;

        let flat_data: Vec<f32> = window.iter().map(|&v| v as f32).collect();
        let shape = vec![1, window.len(), 1];

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data))
            .map_err(|e| ForecastError::inference(format!("Input value creation failed: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| ForecastError::inference(e.to_string()))?;

        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| ForecastError::inference("No output found"))?;
        let data = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| ForecastError::inference(e.to_string()))?;
        let prediction = data
            .1
            .iter()
            .next()
            .ok_or_else(|| ForecastError::inference("Empty output"))?;

        Ok(*prediction as f64)
    }

    fn name(&self) -> &str {
        "ONNX Runtime (LSTM)"
    }

    fn version(&self) -> &str {
        "onnx-v1"
    }
}
