use crate::domain::errors::ModelLoadError;
use crate::domain::metadata::ModelMetadata;
use crate::domain::ports::{ForecastModel, ModelHandle};
use crate::domain::scaler::MinMaxScaler;
use crate::infrastructure::artifacts::{ArtifactPaths, load_metadata, load_scaler};
use crate::infrastructure::model_loader::load_model;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Everything loaded once at startup and shared read-only by all requests.
#[derive(Debug)]
pub struct ForecastContext {
    model: ModelHandle,
    scaler: MinMaxScaler,
    metadata: ModelMetadata,
}

/// Public description of the loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub model_version: String,
    pub stock_symbol: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub look_back: usize,
    pub metrics: BTreeMap<String, f64>,
}

impl ForecastContext {
    /// Assemble a context from already-loaded parts, checking that the model
    /// and metadata agree on the window length.
    pub fn new(
        model: Arc<dyn ForecastModel>,
        scaler: MinMaxScaler,
        metadata: ModelMetadata,
    ) -> Result<Self, ModelLoadError> {
        metadata.validate().map_err(ModelLoadError::InvalidMetadata)?;
        scaler.validate().map_err(ModelLoadError::InvalidScaler)?;
        if model.look_back() != metadata.look_back {
            return Err(ModelLoadError::IncompatibleShape {
                reason: format!(
                    "model expects {} inputs but metadata declares look_back={}",
                    model.look_back(),
                    metadata.look_back
                ),
            });
        }

        Ok(Self {
            model: ModelHandle::new(model),
            scaler,
            metadata,
        })
    }

    /// Load metadata, scaler and model from disk. Any failure is fatal.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ModelLoadError> {
        let metadata = load_metadata(&paths.metadata)?;
        let scaler = load_scaler(&paths.scaler)?;
        let model = load_model(&paths.model, metadata.look_back)?;

        let context = Self::new(model, scaler, metadata)?;
        info!(
            "Forecast context ready: {} {} (look_back={})",
            context.model.name(),
            context.model.version(),
            context.look_back()
        );
        Ok(context)
    }

    pub fn look_back(&self) -> usize {
        self.metadata.look_back
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.model.name().to_string(),
            model_version: self.model.version().to_string(),
            stock_symbol: self.metadata.stock_symbol.clone(),
            start_date: self.metadata.start_date,
            end_date: self.metadata.end_date,
            look_back: self.metadata.look_back,
            metrics: self.metadata.metrics.clone(),
        }
    }
}
