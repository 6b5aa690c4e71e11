//! Backup job configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storj_backup_bridge::StorjConfig;

/// Which local files go into the archive.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Glob patterns, expanded in order.
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Top-level JSON document accepted by the CLI.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub files: FilesConfig,
    pub storj: StorjConfig,
}

impl BackupConfig {
    pub fn from_json(json: &str) -> SyncResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> SyncResult<()> {
        self.storj
            .validate()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        if self.files.paths.iter().any(|p| p.is_empty()) {
            return Err(SyncError::Config(
                "files.paths must not contain empty patterns".into(),
            ));
        }
        Ok(())
    }
}
