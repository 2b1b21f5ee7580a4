use crate::domain::errors::ForecastError;
use std::sync::Arc;
use tracing::error;

/// A trained sequence model mapping a normalized window to the next
/// normalized value.
///
/// Implementations may assume the window length has already been checked
/// against `look_back()`; callers go through [`ModelHandle`].
pub trait ForecastModel: Send + Sync {
    /// Window length the model was trained on
    fn look_back(&self) -> usize;

    /// Predict the next normalized value for a full window
    fn infer(&self, window: &[f64]) -> Result<f64, ForecastError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}

/// Shared, read-only handle to the loaded model.
///
/// Validates the window shape on every call and rejects non-finite outputs
/// so a misbehaving model never leaks NaN into a response.
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<dyn ForecastModel>,
}

impl ModelHandle {
    pub fn new(model: Arc<dyn ForecastModel>) -> Self {
        Self { model }
    }

    pub fn look_back(&self) -> usize {
        self.model.look_back()
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub fn version(&self) -> &str {
        self.model.version()
    }

    pub fn predict_one(&self, window: &[f64]) -> Result<f64, ForecastError> {
        let expected = self.model.look_back();
        if window.len() != expected {
            error!(
                "Window length mismatch presented to {}: expected {}, got {}",
                self.model.name(),
                expected,
                window.len()
            );
            return Err(ForecastError::Shape {
                expected,
                actual: window.len(),
            });
        }

        let prediction = self.model.infer(window)?;
        if !prediction.is_finite() {
            return Err(ForecastError::inference(format!(
                "{} produced a non-finite prediction ({})",
                self.model.name(),
                prediction
            )));
        }
        Ok(prediction)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.model.name())
            .field("version", &self.model.version())
            .field("look_back", &self.model.look_back())
            .finish()
    }
}
