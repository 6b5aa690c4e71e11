//! Bridge double and fixtures for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use storj_backup_bridge::{
    BasicAuth, BridgeApi, BridgeError, BridgeResult, BucketToken, CredentialPaths, StorjConfig,
    TokenOperation, UploadedFile,
};
use storj_backup_crypto::KeyPair;
use storj_backup_sync::{BackupConfig, FilesConfig, SyncOptions};
use tempfile::TempDir;

#[derive(Default)]
pub struct MockBridge {
    pub fail_register: AtomicBool,
    pub fail_token: AtomicBool,
    pub fail_store: AtomicBool,
    pub register_calls: AtomicUsize,
    pub token_calls: AtomicUsize,
    pub store_calls: AtomicUsize,
    pub registered_keys: Mutex<Vec<String>>,
    /// (remote file name, uploaded bytes)
    pub stored: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_register() -> Self {
        let mock = Self::default();
        mock.fail_register.store(true, Ordering::SeqCst);
        mock
    }

    pub fn failing_token() -> Self {
        let mock = Self::default();
        mock.fail_token.store(true, Ordering::SeqCst);
        mock
    }

    pub fn failing_store() -> Self {
        let mock = Self::default();
        mock.fail_store.store(true, Ordering::SeqCst);
        mock
    }

    pub fn registrations(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn stores(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BridgeApi for MockBridge {
    async fn add_public_key(&self, _auth: &BasicAuth, public_key: &str) -> BridgeResult<()> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(BridgeError::AuthFailed("401: invalid email or password".into()));
        }
        self.registered_keys
            .lock()
            .unwrap()
            .push(public_key.to_string());
        Ok(())
    }

    async fn create_token(
        &self,
        _keypair: &KeyPair,
        bucket: &str,
        operation: TokenOperation,
    ) -> BridgeResult<BucketToken> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_token.load(Ordering::SeqCst) {
            return Err(BridgeError::Api("500: token service unavailable".into()));
        }
        Ok(BucketToken {
            token: "push-token".into(),
            bucket: bucket.into(),
            operation,
            expires: None,
        })
    }

    async fn store_file_in_bucket(
        &self,
        _bucket: &str,
        token: &str,
        path: &Path,
        file_name: &str,
    ) -> BridgeResult<UploadedFile> {
        let n = self.store_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(token, "push-token");
        if self.fail_store.load(Ordering::SeqCst) {
            return Err(BridgeError::Api("507: storage full".into()));
        }
        let data = std::fs::read(path).expect("encrypted file must exist when stored");
        let size = data.len() as u64;
        self.stored
            .lock()
            .unwrap()
            .push((file_name.to_string(), data));
        Ok(UploadedFile {
            id: format!("file-{n}"),
            filename: file_name.to_string(),
            mimetype: "application/octet-stream".into(),
            size,
        })
    }
}

pub fn test_config() -> StorjConfig {
    let mut config = StorjConfig::new("bucket-1", "correct horse battery staple");
    config.email = Some("backup@example.com".into());
    config.password = Some("hunter2".into());
    config
}

pub fn backup_config(patterns: &[&str]) -> BackupConfig {
    BackupConfig {
        files: FilesConfig {
            paths: patterns.iter().map(|p| p.to_string()).collect(),
        },
        storj: test_config(),
    }
}

/// Scratch directories for one pipeline run.
pub struct Sandbox {
    pub temp_root: TempDir,
    pub working_dir: TempDir,
    pub data_dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            temp_root: TempDir::new().unwrap(),
            working_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
        }
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.working_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn credentials(&self) -> CredentialPaths {
        CredentialPaths::new(self.data_dir.path().join("creds"))
    }

    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            temp_root: self.temp_root.path().to_path_buf(),
            working_dir: self.working_dir.path().to_path_buf(),
            credentials: self.credentials(),
            tar_program: PathBuf::from("tar"),
        }
    }

    /// Entries left under the temp root.
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_root.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}
