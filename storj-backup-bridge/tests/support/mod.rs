//! In-process bridge double for uploader and bootstrap tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use storj_backup_bridge::{
    BasicAuth, BridgeApi, BridgeError, BridgeResult, BucketToken, StorjConfig, TokenOperation,
    UploadedFile,
};
use storj_backup_crypto::KeyPair;

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
