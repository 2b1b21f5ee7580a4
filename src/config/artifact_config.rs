//! Trained artifact locations from environment variables.

use crate::infrastructure::artifacts::ArtifactPaths;
use std::env;
use std::path::PathBuf;

/// Artifact environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEnvConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub scaler_file: String,
    pub metadata_file: String,
}

impl Default for ArtifactEnvConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model_artifacts"),
            model_file: "lstm_model.onnx".to_string(),
            scaler_file: "scaler.json".to_string(),
            metadata_file: "metadata.json".to_string(),
        }
    }
}

impl ArtifactEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_dir: env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            model_file: env::var("MODEL_FILE").unwrap_or(defaults.model_file),
            scaler_file: env::var("SCALER_FILE").unwrap_or(defaults.scaler_file),
            metadata_file: env::var("METADATA_FILE").unwrap_or(defaults.metadata_file),
        }
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.model_dir,
            &self.model_file,
            &self.scaler_file,
            &self.metadata_file,
        )
    }
}
