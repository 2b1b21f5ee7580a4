//! Configuration module for Pricecast.
//!
//! Structured configuration loaded from environment variables, organized by
//! concern: Server, Artifacts, and Observability.

mod artifact_config;
mod observability_config;
mod server_config;

pub use artifact_config::ArtifactEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub artifacts: ArtifactEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerEnvConfig::from_env().context("Failed to load server config")?,
            artifacts: ArtifactEnvConfig::from_env(),
            observability: ObservabilityEnvConfig::from_env(),
        })
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
/// A set but unparseable value is an error.
pub(crate) fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key)),
        Err(_) => Ok(default),
    }
}
