//! HTTP server configuration parsing from environment variables.

use super::parse_var;
use anyhow::Result;
use std::env;
use std::time::Duration;

/// Server environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    /// Whole-request prediction timeout; 0 disables it
    pub request_timeout_ms: u64,
    /// Upper bound on `future_steps`; 0 disables the cap
    pub max_future_steps: usize,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_ms: 30_000,
            max_future_steps: 365,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: env::var("SERVER_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_var("SERVER_PORT", defaults.port)?,
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?,
            max_future_steps: parse_var("MAX_FUTURE_STEPS", defaults.max_future_steps)?,
        })
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    pub fn future_steps_cap(&self) -> Option<usize> {
        (self.max_future_steps > 0).then_some(self.max_future_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limits() {
        let config = ServerEnvConfig {
            request_timeout_ms: 0,
            max_future_steps: 0,
            ..ServerEnvConfig::default()
        };
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.future_steps_cap(), None);
    }

    #[test]
    fn test_socket_address() {
        let config = ServerEnvConfig::default();
        assert_eq!(config.socket_address(), "0.0.0.0:8000");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.future_steps_cap(), Some(365));
    }
}
