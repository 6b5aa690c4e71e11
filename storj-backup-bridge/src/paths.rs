//! Local credential directory layout.
//!
//! One directory per installation holds the registered private key and the
//! keyring. It is passed around explicitly so tests can point it at a
//! scratch directory.

use crate::error::{BridgeError, BridgeResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use storj_backup_crypto::KeyPair;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// File name of the hex-encoded private key.
pub const PRIVATE_KEY_FILE: &str = "private.key";

/// File name of the sealed keyring.
pub const KEYRING_FILE: &str = "keyring.json";

/// Directory name used under the home directory by default.
pub const DEFAULT_DIR_NAME: &str = ".storj-backup";

/// Paths of the per-installation credential state.
#[derive(Clone, Debug)]
pub struct CredentialPaths {
    data_dir: PathBuf,
}

impl CredentialPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// `~/.storj-backup`.
    pub fn default_location() -> BridgeResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            BridgeError::Config("cannot determine home directory for credential storage".into())
        })?;
        Ok(Self::new(home.join(DEFAULT_DIR_NAME)))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn private_key_path(&self) -> PathBuf {
        self.data_dir.join(PRIVATE_KEY_FILE)
    }

    pub fn keyring_path(&self) -> PathBuf {
        self.data_dir.join(KEYRING_FILE)
    }

    /// Creates the credential directory if needed.
    ///
    /// Returns `true` if it was created. An existing directory is not an
    /// error; anything else in the way is.
    pub async fn ensure_data_dir(&self) -> BridgeResult<bool> {
        if tokio::fs::metadata(&self.data_dir)
            .await
            .is_ok_and(|m| m.is_dir())
        {
            debug!("credential directory {} already exists", self.data_dir.display());
            return Ok(false);
        }

        info!("Creating folder {}", self.data_dir.display());
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(true)
    }

    pub async fn has_private_key(&self) -> BridgeResult<bool> {
        Ok(tokio::fs::try_exists(self.private_key_path()).await?)
    }

    /// Loads the registered keypair.
    pub async fn load_keypair(&self) -> BridgeResult<KeyPair> {
        let path = self.private_key_path();
        let encoded = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BridgeError::KeyNotFound(path));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(KeyPair::from_private_hex(&encoded)?)
    }

    /// Writes the private key. Fails if a key file already exists.
    pub async fn store_keypair(&self, keypair: &KeyPair) -> BridgeResult<()> {
        let path = self.private_key_path();
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::AlreadyExists {
                BridgeError::Keyring(format!(
                    "refusing to overwrite existing private key {}",
                    path.display()
                ))
            } else {
                e.into()
            }
        })?;

        file.write_all(keypair.private_hex().as_bytes()).await?;
        file.sync_all().await?;
        debug!("wrote private key to {}", path.display());
        Ok(())
    }
}
