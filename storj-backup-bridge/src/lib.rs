//! Remote side of storj-backup.
//!
//! Provides:
//! - [`BridgeApi`] and its HTTP implementation [`BridgeClient`]
//! - One-time keypair registration ([`CredentialBootstrapper`])
//! - The passphrase-protected [`Keyring`] of per-file secrets
//! - [`EncryptedUploader`], which ties the three together for one archive

pub mod api_client;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod keyring;
pub mod paths;
pub mod types;
pub mod uploader;

pub use api_client::{BridgeApi, BridgeClient};
pub use bootstrap::{BootstrapOutcome, BootstrapState, CredentialBootstrapper};
pub use config::{normalize_destination, StorjConfig};
pub use error::{BridgeError, BridgeResult};
pub use keyring::Keyring;
pub use paths::CredentialPaths;
pub use types::*;
pub use uploader::EncryptedUploader;
