//! Bridge error types.

use std::path::PathBuf;
use storj_backup_crypto::CryptoError;
use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while talking to the bridge or managing the
/// local credential state that goes with it.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("private key not found at {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("keyring passphrase is incorrect or the keyring is corrupt")]
    KeyringLocked,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
