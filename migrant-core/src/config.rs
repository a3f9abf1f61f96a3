//! Configuration management.

use crate::error::{MigrantError, Result};
use crate::executor::MigrationPolicy;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent configuration for migrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy gate: when false every migration run ends in `error`.
    pub volume_c_allowed: bool,
    /// Simulated transfer time of a successful migration.
    pub transfer_delay_secs: u64,
    pub snapshot_path: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume_c_allowed: true,
            transfer_delay_secs: 60,
            snapshot_path: paths::snapshot_path().to_string_lossy().to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        paths::config_dir().join("config.json")
    }

    /// Load configuration from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MigrantError::InvalidConfig {
            reason: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| MigrantError::InvalidConfig {
            reason: format!("Failed to parse config {}: {}", path.display(), e),
        })
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MigrantError::IoError { path: parent.to_path_buf(), source: e })?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| MigrantError::InvalidConfig {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)
            .map_err(|e| MigrantError::IoError { path: path.to_path_buf(), source: e })
    }

    #[must_use]
    pub fn policy(&self) -> MigrationPolicy {
        MigrationPolicy { volume_c_allowed: self.volume_c_allowed }
    }

    #[must_use]
    pub fn transfer_delay(&self) -> Duration {
        Duration::from_secs(self.transfer_delay_secs)
    }
}
