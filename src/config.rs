// src/config.rs

//! Configuration types for the window limiter

// dependencies
use crate::errors::{Result, WindowLimiterError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for window limiter behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLimiterConfig {
    /// Maximum attempts accepted inside one window
    #[serde(default = "default_limit")]
    pub(crate) limit: u32,

    /// Width of the sliding window in milliseconds
    #[serde(default = "default_window_ms")]
    pub(crate) window_ms: u64,
}

fn default_limit() -> u32 {
    3
}

fn default_window_ms() -> u64 {
    60_000
}

impl Default for WindowLimiterConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_ms: default_window_ms(),
        }
    }
}

impl WindowLimiterConfig {
    /// Create a new configuration with limit and window settings
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self { limit, window_ms }
    }

    /// Builder-style: set the attempt limit
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Builder-style: set the window width in milliseconds
    pub fn window_ms(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(WindowLimiterError::InvalidLimit);
        }
        if self.window_ms == 0 {
            return Err(WindowLimiterError::InvalidWindow);
        }
        Ok(())
    }

    /// Parse and validate a configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: WindowLimiterConfig = serde_yaml::from_str(contents)
            .map_err(|e| WindowLimiterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}
