//! Reading and writing the trained artifacts (metadata, scaler, model).

use crate::domain::errors::ModelLoadError;
use crate::domain::metadata::ModelMetadata;
use crate::domain::scaler::MinMaxScaler;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Locations of the three artifacts produced by a training run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>, model_file: &str, scaler_file: &str, metadata_file: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(model_file),
            scaler: dir.join(scaler_file),
            metadata: dir.join(metadata_file),
        }
    }
}

pub(crate) fn open_artifact(path: &Path) -> Result<BufReader<File>, ModelLoadError> {
    if !path.exists() {
        return Err(ModelLoadError::Missing {
            path: path.to_path_buf(),
        });
    }
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelLoadError> {
    let reader = open_artifact(path)?;
    serde_json::from_reader(reader).map_err(|e| ModelLoadError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

pub fn load_metadata(path: &Path) -> Result<ModelMetadata, ModelLoadError> {
    let metadata: ModelMetadata = read_json(path)?;
    metadata.validate().map_err(ModelLoadError::InvalidMetadata)?;
    info!(
        "Loaded model metadata from {:?} (look_back={}, metrics={:?})",
        path, metadata.look_back, metadata.metrics
    );
    Ok(metadata)
}

pub fn load_scaler(path: &Path) -> Result<MinMaxScaler, ModelLoadError> {
    let scaler: MinMaxScaler = read_json(path)?;
    scaler.validate().map_err(ModelLoadError::InvalidScaler)?;
    info!(
        "Loaded scaler from {:?} (range [{}, {}])",
        path, scaler.data_min, scaler.data_max
    );
    Ok(scaler)
}

/// Write any artifact as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_and_scaler_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path(), "model.json", "scaler.json", "metadata.json");

        let metadata = ModelMetadata::new(3).with_metric("MAE", 1.25);
        let scaler = MinMaxScaler::fit(&[100.0, 200.0]).unwrap();
        write_json(&paths.metadata, &metadata).unwrap();
        write_json(&paths.scaler, &scaler).unwrap();

        assert_eq!(load_metadata(&paths.metadata).unwrap(), metadata);
        assert_eq!(load_scaler(&paths.scaler).unwrap(), scaler);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_metadata(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelLoadError::Missing { .. }));
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_scaler(&path).unwrap_err(),
            ModelLoadError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_invalid_metadata_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, r#"{"look_back": 0, "metrics": {}}"#).unwrap();
        assert!(matches!(
            load_metadata(&path).unwrap_err(),
            ModelLoadError::InvalidMetadata(_)
        ));
    }
}
