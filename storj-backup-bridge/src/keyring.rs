//! Passphrase-protected keyring of per-file secrets.
//!
//! Maps remote file ids to the [`DataCipherKeyIv`] each file was encrypted
//! with. The whole map is sealed with a key derived from the passphrase
//! (Argon2id -> ChaCha20-Poly1305) and rewritten atomically on every
//! insert. Entries are never replaced or removed.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use storj_backup_crypto::{
    decrypt, derive_key, encrypt, DataCipherKeyIv, DerivedKey, EncryptedData, KdfParams, Salt,
    SALT_SIZE,
};
use tokio::io::AsyncWriteExt;
use tracing::debug;

const KEYRING_VERSION: u32 = 1;

/// On-disk envelope. Only the salt and KDF parameters are in the clear.
#[derive(Serialize, Deserialize)]
struct SealedKeyring {
    version: u32,
    salt: [u8; SALT_SIZE],
    kdf: KdfParams,
    sealed: EncryptedData,
}

/// Unlocked keyring.
#[derive(Debug)]
pub struct Keyring {
    path: PathBuf,
    key: DerivedKey,
    salt: Salt,
    kdf: KdfParams,
    entries: BTreeMap<String, DataCipherKeyIv>,
}

impl Keyring {
    /// Opens the keyring at `path`, or starts an empty one if the file
    /// doesn't exist yet. Nothing is written until the first [`set`](Self::set).
    pub async fn open(path: impl Into<PathBuf>, passphrase: &str) -> BridgeResult<Self> {
        let path = path.into();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no keyring at {}, starting empty", path.display());
                let salt = Salt::random();
                let kdf = KdfParams::default();
                let key = derive_key(passphrase, &salt, &kdf)?;
                return Ok(Self {
                    path,
                    key,
                    salt,
                    kdf,
                    entries: BTreeMap::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let file: SealedKeyring = serde_json::from_slice(&bytes)
            .map_err(|e| BridgeError::Keyring(format!("unreadable keyring file: {e}")))?;
        if file.version != KEYRING_VERSION {
            return Err(BridgeError::Keyring(format!(
                "unsupported keyring version {}",
                file.version
            )));
        }

        let salt = Salt::from_bytes(file.salt);
        let key = derive_key(passphrase, &salt, &file.kdf)?;
        let plaintext = decrypt(&key, &file.sealed).map_err(|_| BridgeError::KeyringLocked)?;
        let entries = serde_json::from_slice(&plaintext)?;

        Ok(Self {
            path,
            key,
            salt,
            kdf: file.kdf,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, file_id: &str) -> Option<&DataCipherKeyIv> {
        self.entries.get(file_id)
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.entries.contains_key(file_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds the secret for `file_id` and persists the keyring.
    ///
    /// If persisting fails the entry is dropped again, so memory and disk
    /// never disagree.
    pub async fn set(&mut self, file_id: impl Into<String>, secret: DataCipherKeyIv) -> BridgeResult<()> {
        let file_id = file_id.into();
        if self.entries.contains_key(&file_id) {
            return Err(BridgeError::Keyring(format!(
                "secret for file {file_id} already stored"
            )));
        }

        self.entries.insert(file_id.clone(), secret);
        if let Err(e) = self.persist().await {
            self.entries.remove(&file_id);
            return Err(e);
        }

        debug!("stored secret for file {file_id} in keyring");
        Ok(())
    }

    async fn persist(&self) -> BridgeResult<()> {
        let plaintext = serde_json::to_vec(&self.entries)?;
        let sealed = encrypt(&self.key, &plaintext)?;
        let file = SealedKeyring {
            version: KEYRING_VERSION,
            salt: *self.salt.as_bytes(),
            kdf: self.kdf.clone(),
            sealed,
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        if let Err(e) = write_then_rename(&tmp_path, &self.path, &bytes).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    debug!("failed to remove {}: {cleanup}", tmp_path.display());
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

async fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> BridgeResult<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut out = options.open(tmp_path).await?;
    out.write_all(bytes).await?;
    out.sync_all().await?;
    drop(out);

    tokio::fs::rename(tmp_path, path).await?;
    Ok(())
}
