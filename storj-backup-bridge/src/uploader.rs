//! Encrypted archive upload.
//!
//! Encrypts an archive with a fresh per-file secret, pushes it through the
//! bridge's token-then-store protocol and records the secret in the keyring
//! once the bridge has confirmed the file.

use crate::api_client::BridgeApi;
use crate::config::StorjConfig;
use crate::error::BridgeResult;
use crate::keyring::Keyring;
use crate::paths::CredentialPaths;
use crate::types::{TokenOperation, UploadedFile};
use std::path::Path;
use std::sync::Arc;
use storj_backup_crypto::{encrypt_file, DataCipherKeyIv};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Suffix of the encrypted sibling written next to the archive.
pub const ENCRYPTED_SUFFIX: &str = ".crypt";

/// Uploads archives to the configured bucket.
pub struct EncryptedUploader {
    api: Arc<dyn BridgeApi>,
    paths: CredentialPaths,
}

impl EncryptedUploader {
    pub fn new(api: Arc<dyn BridgeApi>, paths: CredentialPaths) -> Self {
        Self { api, paths }
    }

    /// Unlocks the keyring once for a batch of uploads.
    pub async fn open_keyring(&self, config: &StorjConfig) -> BridgeResult<Mutex<Keyring>> {
        let keyring = Keyring::open(self.paths.keyring_path(), &config.keypass).await?;
        Ok(Mutex::new(keyring))
    }

    /// Encrypts `work_dir/archive_name` and stores it in the bucket.
    ///
    /// Concurrent uploads share `keyring`; it is locked only to record the
    /// secret. The encrypted copy is left in `work_dir`; the caller owns
    /// that directory and removes it.
    pub async fn upload(
        &self,
        config: &StorjConfig,
        keyring: &Mutex<Keyring>,
        work_dir: &Path,
        archive_name: &str,
    ) -> BridgeResult<UploadedFile> {
        let keypair = self.paths.load_keypair().await?;

        let secret = DataCipherKeyIv::generate();
        let source = work_dir.join(archive_name);
        let encrypted = work_dir.join(format!("{archive_name}{ENCRYPTED_SUFFIX}"));
        let destination = config.destination_file(archive_name);

        info!(
            "Attempting to upload {} to the {} bucket into {destination}",
            source.display(),
            config.bucket
        );

        let encrypted_size = encrypt_file(&source, &encrypted, &secret).await?;
        debug!(
            "encrypted {} ({encrypted_size} bytes)",
            encrypted.display()
        );

        let token = self
            .api
            .create_token(&keypair, &config.bucket, TokenOperation::Push)
            .await?;

        let file = self
            .api
            .store_file_in_bucket(&config.bucket, &token.token, &encrypted, &destination)
            .await?;

        keyring.lock().await.set(file.id.clone(), secret).await.map_err(|e| {
            error!(
                "file {} was uploaded but its secret could not be saved: {e}",
                file.id
            );
            e
        })?;

        info!(
            "Name: {}, Type: {}, Size: {} bytes, ID: {}",
            file.filename, file.mimetype, file.size, file.id
        );
        Ok(file)
    }
}
