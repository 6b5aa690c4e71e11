//! One-time client key registration.
//!
//! The presence of the private key file is the only state: no file means
//! the installation still has to register, a file means it already has.

use crate::api_client::BridgeApi;
use crate::config::StorjConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::paths::CredentialPaths;
use std::sync::Arc;
use storj_backup_crypto::KeyPair;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapState {
    Unbootstrapped,
    Bootstrapped,
}

/// What [`CredentialBootstrapper::ensure`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyBootstrapped,
    Registered,
}

/// Generates and registers the client keypair on first use.
pub struct CredentialBootstrapper {
    api: Arc<dyn BridgeApi>,
    paths: CredentialPaths,
}

impl CredentialBootstrapper {
    pub fn new(api: Arc<dyn BridgeApi>, paths: CredentialPaths) -> Self {
        Self { api, paths }
    }

    pub async fn state(&self) -> BridgeResult<BootstrapState> {
        if self.paths.has_private_key().await? {
            Ok(BootstrapState::Bootstrapped)
        } else {
            Ok(BootstrapState::Unbootstrapped)
        }
    }

    /// Registers a new keypair unless one is already stored.
    ///
    /// The key is only written after the bridge accepted the public half;
    /// a failed registration leaves the installation unbootstrapped.
    pub async fn ensure(&self, config: &StorjConfig) -> BridgeResult<BootstrapOutcome> {
        if self.state().await? == BootstrapState::Bootstrapped {
            debug!(
                "private key present at {}, skipping registration",
                self.paths.private_key_path().display()
            );
            return Ok(BootstrapOutcome::AlreadyBootstrapped);
        }

        let auth = config.basic_auth().ok_or_else(|| {
            BridgeError::MissingCredentials(
                "storj.email and storj.password are required to register a new key".into(),
            )
        })?;

        let keypair = KeyPair::generate();
        let public_key = keypair.public_hex();
        info!("Registering public key {public_key} for {}", auth.email);

        self.api
            .add_public_key(&auth, &public_key)
            .await
            .map_err(|e| {
                warn!("public key registration failed: {e}");
                e
            })?;

        self.paths.store_keypair(&keypair).await?;
        info!(
            "Saved private key to {}",
            self.paths.private_key_path().display()
        );
        Ok(BootstrapOutcome::Registered)
    }
}
