use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while serving a forecast request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("At least {required} historical points are required for prediction, got {provided}")]
    InsufficientHistory { required: usize, provided: usize },

    #[error("Window shape mismatch: model expects {expected} values, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Prediction timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The caller stopped waiting; the result would never be delivered
    #[error("Prediction cancelled")]
    Cancelled,
}

/// Who is at fault for a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Client,
    Internal,
}

impl ForecastError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::InsufficientHistory { .. } => ErrorKind::Client,
            Self::Shape { .. } | Self::Inference(_) | Self::Timeout { .. } | Self::Cancelled => {
                ErrorKind::Internal
            }
        }
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Shape { .. } | Self::Inference(_) => "internal_error",
        }
    }
}

/// Fatal errors while loading the trained artifacts at startup
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Artifact not found: {path:?}")]
    Missing { path: PathBuf },

    #[error("Failed to read artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt artifact {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Incompatible model shape: {reason}")]
    IncompatibleShape { reason: String },

    #[error("Invalid model metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid scaler state: {0}")]
    InvalidScaler(String),

    #[error("Unsupported model format for {path:?} (expected .onnx or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Model runtime error: {0}")]
    Runtime(String),
}
