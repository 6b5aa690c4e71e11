//! Per-run scratch directory.

use crate::error::{SyncError, SyncResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name prefix of every workspace directory.
pub const WORKSPACE_PREFIX: &str = "storj_backup_";

/// A uniquely named temporary directory owned by one sync run.
///
/// Call [`destroy`](Self::destroy) to remove it and observe errors. If the
/// value is dropped without that (a panic mid-run), removal is attempted
/// on drop and errors are ignored.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    /// Creates `<temp_root>/storj_backup_<16 hex chars>`.
    pub async fn create(temp_root: &Path) -> SyncResult<Self> {
        let suffix = hex::encode(rand::random::<[u8; 8]>());
        let path = temp_root.join(format!("{WORKSPACE_PREFIX}{suffix}"));

        info!("Creating folder {}", path.display());
        tokio::fs::create_dir(&path).await.map_err(|e| {
            SyncError::Workspace(format!("cannot create {}: {e}", path.display()))
        })?;

        Ok(Self {
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the workspace and everything in it.
    pub async fn destroy(mut self) -> SyncResult<()> {
        self.released = true;
        remove_rf(&self.path).await
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!("failed to remove workspace {}: {e}", self.path.display());
                }
            }
        }
    }
}

/// Recursively removes `target`. A missing target is not an error.
pub async fn remove_rf(target: &Path) -> SyncResult<()> {
    let meta = match tokio::fs::symlink_metadata(target).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(SyncError::Workspace(format!(
                "cannot inspect {}: {e}",
                target.display()
            )));
        }
    };

    info!("Removing {}", target.display());
    let removed = if meta.is_dir() {
        tokio::fs::remove_dir_all(target).await
    } else {
        tokio::fs::remove_file(target).await
    };

    match removed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::Workspace(format!(
            "cannot remove {}: {e}",
            target.display()
        ))),
    }
}
