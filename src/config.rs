//! Reader configuration.
//!
//! Loaded from JSON; missing fields fall back to [`ReaderConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Scratch buffer size used when no config is supplied.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 64 * 1024;

/// Smallest scratch buffer that still holds a fixed-width `u64`.
pub const MIN_SCRATCH_CAPACITY: usize = 8;

/// Configuration for a [`crate::RowReader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Size of the per-reader scratch buffer in bytes. Also the upper bound
    /// on any length-prefixed field; longer fields fail with
    /// [`Error::BufferTooSmall`].
    /// Default: 64 KiB
    pub scratch_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }
}

impl ReaderConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: ReaderConfig =
            serde_json::from_str(raw).map_err(|err| Error::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty JSON in the same shape [`ReaderConfig::from_json_str`] accepts.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::InvalidConfig(err.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scratch_capacity < MIN_SCRATCH_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "scratch_capacity must be at least {MIN_SCRATCH_CAPACITY} bytes, got {}",
                self.scratch_capacity
            )));
        }
        Ok(())
    }
}
