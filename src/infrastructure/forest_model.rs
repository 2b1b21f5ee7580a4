use crate::domain::errors::{ForecastError, ModelLoadError};
use crate::domain::ports::ForecastModel;
use crate::infrastructure::artifacts::{read_json, write_json};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;
use tracing::info;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Hyperparameters for the random forest baseline
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_split: 5,
        }
    }
}

/// On-disk form: the forest plus the window length it was fitted on
#[derive(Serialize, Deserialize)]
struct ForestArtifact {
    look_back: usize,
    model: Forest,
}

/// Random forest regressor over the `look_back` normalized lags.
pub struct ForestForecastModel {
    artifact: ForestArtifact,
}

impl ForestForecastModel {
    pub fn load(model_path: &Path, look_back: usize) -> Result<Self, ModelLoadError> {
        let artifact: ForestArtifact = read_json(model_path)?;
        if artifact.look_back != look_back {
            return Err(ModelLoadError::IncompatibleShape {
                reason: format!(
                    "forest was trained on {} lags but metadata declares look_back={}",
                    artifact.look_back, look_back
                ),
            });
        }
        info!(
            "Successfully loaded random forest model from {:?} (look_back={})",
            model_path, look_back
        );
        Ok(Self { artifact })
    }

    /// Fit on supervised windows; every row of `x` must have the same length.
    pub fn train(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> anyhow::Result<Self> {
        let look_back = x
            .first()
            .map(|row| row.len())
            .ok_or_else(|| anyhow::anyhow!("No training samples"))?;

        let x_matrix = DenseMatrix::from_2d_vec(&x.to_vec())
            .map_err(|e| anyhow::anyhow!("Matrix error: {}", e))?;
        let forest_params = RandomForestRegressorParameters::default()
            .with_n_trees(params.n_trees)
            .with_max_depth(params.max_depth)
            .with_min_samples_split(params.min_split);
        let model = RandomForestRegressor::fit(&x_matrix, &y.to_vec(), forest_params)
            .map_err(|e| anyhow::anyhow!("Training failed: {}", e))?;

        Ok(Self {
            artifact: ForestArtifact { look_back, model },
        })
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        write_json(path, &self.artifact)
    }

    /// Batch prediction, used for offline evaluation
    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        let matrix = DenseMatrix::from_2d_vec(&x.to_vec())
            .map_err(|e| ForecastError::inference(format!("Matrix creation failed: {}", e)))?;
        self.artifact
            .model
            .predict(&matrix)
            .map_err(|e| ForecastError::inference(format!("Prediction failed: {}", e)))
    }
}

impl ForecastModel for ForestForecastModel {
    fn look_back(&self) -> usize {
        self.artifact.look_back
    }

    fn infer(&self, window: &[f64]) -> Result<f64, ForecastError> {
        self.predict_batch(&[window.to_vec()])?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::inference("No prediction returned"))
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }

    fn version(&self) -> &str {
        "v1.0"
    }
}
