use pretty_assertions::assert_eq;
use storj_backup_sync::{BackupConfig, SyncError};
use tempfile::TempDir;

const FULL: &str = r#"{
    "files": { "paths": ["docs/**/*.md", "/etc/hosts"] },
    "storj": {
        "bucket": "b1",
        "destination": "nightly",
        "keypass": "pass",
        "concurrency": 2,
        "email": "me@example.com",
        "password": "secret"
    }
}"#;

#[test]
fn parses_full_document() {
    let config = BackupConfig::from_json(FULL).unwrap();

    assert_eq!(config.files.paths, vec!["docs/**/*.md", "/etc/hosts"]);
    assert_eq!(config.storj.bucket, "b1");
    assert_eq!(config.storj.concurrency, 2);
    assert_eq!(config.storj.email.as_deref(), Some("me@example.com"));
}

#[test]
fn files_section_is_optional() {
    let config =
        BackupConfig::from_json(r#"{ "storj": { "bucket": "b1", "keypass": "pass" } }"#).unwrap();

    assert!(config.files.paths.is_empty());
    assert_eq!(config.storj.concurrency, 6);
}

#[test]
fn missing_storj_section_is_rejected() {
    let err = BackupConfig::from_json(r#"{ "files": { "paths": ["*"] } }"#).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
}

#[test]
fn malformed_json_is_rejected() {
    let err = BackupConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
}

#[test]
fn empty_pattern_is_rejected() {
    let json = r#"{ "files": { "paths": ["a", ""] }, "storj": { "bucket": "b", "keypass": "k" } }"#;
    let err = BackupConfig::from_json(json).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
}

#[test]
fn invalid_storj_section_is_rejected() {
    let json = r#"{ "storj": { "bucket": "", "keypass": "k" } }"#;
    let err = BackupConfig::from_json(json).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
}

#[test]
fn load_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("backup.json");
    std::fs::write(&path, FULL).unwrap();

    let config = BackupConfig::load(&path).unwrap();
    assert_eq!(config.storj.bucket, "b1");
}

#[test]
fn load_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = BackupConfig::load(&dir.path().join("nope.json")).unwrap_err();

    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
    assert!(err.to_string().contains("nope.json"));
}
