//! Controller configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Limits a controller enforces on dispatch and settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Unsettled actions the log may hold before dispatch is refused.
    ///
    /// Never above `max_batch_size`: a settlement must cover every pending
    /// action, so a longer suffix could never settle.
    pub max_pending_actions: usize,

    /// Largest attestation (in folded actions) accepted by `settle`
    pub max_batch_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_pending_actions: 128,
            max_batch_size: 128,
        }
    }
}

impl ControllerConfig {
    /// Create a config for local development
    pub fn local() -> Self {
        Self {
            max_pending_actions: 16,
            max_batch_size: 16,
        }
    }

    /// Create a config for production deployments
    pub fn production() -> Self {
        Self {
            max_pending_actions: 1024,
            max_batch_size: 1024,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending_actions == 0 {
            return Err(ConfigError::Invalid(
                "max_pending_actions must be at least 1".to_string(),
            ));
        }
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.max_pending_actions > self.max_batch_size {
            return Err(ConfigError::Invalid(format!(
                "max_pending_actions ({}) exceeds max_batch_size ({})",
                self.max_pending_actions, self.max_batch_size
            )));
        }
        Ok(())
    }
}
