//! Pipeline error types.

use storj_backup_bridge::BridgeError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that end a sync run. Each pipeline stage maps to one variant.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("workspace error: {0}")]
    Workspace(String),

    #[error("pattern resolution failed: {0}")]
    Resolution(String),

    #[error("tar exited with code {code}")]
    CompressionExit { code: i32 },

    #[error("compression failed: {0}")]
    Compression(String),

    #[error("credential bootstrap failed: {0}")]
    Bootstrap(#[source] BridgeError),

    #[error("upload failed: {0}")]
    Upload(#[source] BridgeError),

    #[error("invalid configuration: {0}")]
    Config(String),
}
