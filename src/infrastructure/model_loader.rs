use crate::domain::errors::ModelLoadError;
use crate::domain::ports::ForecastModel;
use crate::infrastructure::forest_model::ForestForecastModel;
use crate::infrastructure::onnx_model::OnnxForecastModel;
use std::path::Path;
use std::sync::Arc;

/// Model artifact formats understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Onnx,
    RandomForest,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Result<Self, ModelLoadError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("onnx") => Ok(ModelFormat::Onnx),
            Some("json") => Ok(ModelFormat::RandomForest),
            _ => Err(ModelLoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load the model artifact, picking the implementation from its extension
pub fn load_model(path: &Path, look_back: usize) -> Result<Arc<dyn ForecastModel>, ModelLoadError> {
    match ModelFormat::from_path(path)? {
        ModelFormat::Onnx => Ok(Arc::new(OnnxForecastModel::load(path, look_back)?)),
        ModelFormat::RandomForest => Ok(Arc::new(ForestForecastModel::load(path, look_back)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ModelFormat::from_path(Path::new("artifacts/lstm_model.onnx")).unwrap(),
            ModelFormat::Onnx
        );
        assert_eq!(
            ModelFormat::from_path(Path::new("artifacts/forest.JSON")).unwrap(),
            ModelFormat::RandomForest
        );
        assert!(matches!(
            ModelFormat::from_path(Path::new("artifacts/lstm_model.h5")),
            Err(ModelLoadError::UnsupportedFormat { .. })
        ));
    }
}
