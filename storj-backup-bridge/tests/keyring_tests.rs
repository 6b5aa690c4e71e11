use storj_backup_bridge::{BridgeError, Keyring};
use storj_backup_crypto::DataCipherKeyIv;
use tempfile::TempDir;

#[tokio::test]
async fn opening_missing_keyring_is_empty_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");

    let keyring = Keyring::open(&path, "pass").await.unwrap();
    assert!(keyring.is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn set_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");
    let secret = DataCipherKeyIv::generate();

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    keyring.set("file-1", secret.clone()).await.unwrap();
    assert!(path.exists());

    let reopened = Keyring::open(&path, "pass").await.unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.get("file-1"), Some(&secret));
}

#[tokio::test]
async fn entries_accumulate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    keyring.set("a", DataCipherKeyIv::generate()).await.unwrap();
    drop(keyring);

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    keyring.set("b", DataCipherKeyIv::generate()).await.unwrap();

    let reopened = Keyring::open(&path, "pass").await.unwrap();
    assert!(reopened.contains("a"));
    assert!(reopened.contains("b"));
    assert_eq!(reopened.len(), 2);
}

#[tokio::test]
async fn wrong_passphrase_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");

    let mut keyring = Keyring::open(&path, "right").await.unwrap();
    keyring.set("file-1", DataCipherKeyIv::generate()).await.unwrap();

    let err = Keyring::open(&path, "wrong").await.err().unwrap();
    assert!(matches!(err, BridgeError::KeyringLocked));
}

#[tokio::test]
async fn existing_entry_is_never_replaced() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");
    let original = DataCipherKeyIv::generate();

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    keyring.set("file-1", original.clone()).await.unwrap();
    let err = keyring
        .set("file-1", DataCipherKeyIv::generate())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Keyring(_)));

    let reopened = Keyring::open(&path, "pass").await.unwrap();
    assert_eq!(reopened.get("file-1"), Some(&original));
}

#[tokio::test]
async fn secrets_are_not_stored_in_clear() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");
    let secret = DataCipherKeyIv::generate();
    let key_hex = hex::encode(secret.key());

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    keyring.set("file-visible-id", secret).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains(&key_hex));
    assert!(!raw.contains("file-visible-id"));
}

#[tokio::test]
async fn corrupt_file_is_keyring_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");
    std::fs::write(&path, b"not json").unwrap();

    let err = Keyring::open(&path, "pass").await.err().unwrap();
    assert!(matches!(err, BridgeError::Keyring(_)));
}

#[tokio::test]
async fn failed_persist_rolls_back_entry() {
    let dir = TempDir::new().unwrap();
    // Parent "directory" is a regular file, so the write must fail.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let path = blocker.join("keyring.json");

    let mut keyring = Keyring::open(&path, "pass").await.unwrap();
    assert!(keyring.set("file-1", DataCipherKeyIv::generate()).await.is_err());
    assert!(!keyring.contains("file-1"));
}

#[tokio::test]
async fn failed_persist_removes_temp_file_and_entry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keyring.json");
    let mut keyring = Keyring::open(&path, "pass").await.unwrap();

    // A non-empty directory in place of the keyring makes the final rename fail.
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("blocker"), b"x").unwrap();

    let err = keyring
        .set("file-1", DataCipherKeyIv::generate())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Io(_)), "{err:?}");
    assert!(!dir.path().join("keyring.json.tmp").exists());
    assert!(!keyring.contains("file-1"));
}
