//! Run configuration, loaded from TOML with per-field defaults.
//!
//! ```toml
//! [crypto]
//! ring_dimension = 16384
//! scaling_mod_size = 50
//! multiplicative_depth = 3
//!
//! [clustering]
//! k = 2
//! rounds = 5
//!
//! [source]
//! endpoint = "https://feeds.example.net/v1/threat"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::CryptoParams;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub k: usize,
    /// Assign/Update rounds to run
    pub rounds: usize,
    /// Per-cluster offset applied to the global mean when seeding
    pub seed_offset: f64,
    /// Stop before the round budget once labels repeat
    pub stop_when_stable: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: 2,
            rounds: 5,
            seed_offset: 0.05,
            stop_when_stable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Threat feed URL returning a JSON array of records
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crypto: CryptoParams,
    pub clustering: ClusteringConfig,
    pub source: SourceConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| PipelineError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.crypto
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.clustering.k == 0 {
            return Err(PipelineError::Config(
                "clustering.k must be greater than 0".into(),
            ));
        }
        if self.clustering.rounds == 0 {
            return Err(PipelineError::Config(
                "clustering.rounds must be greater than 0".into(),
            ));
        }
        if !self.clustering.seed_offset.is_finite() {
            return Err(PipelineError::Config(
                "clustering.seed_offset must be finite".into(),
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "source.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
