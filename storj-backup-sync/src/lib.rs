//! Backup pipeline for storj-backup.
//!
//! A run resolves glob patterns to files, bundles them into a timestamped
//! `tar.gz` in a private workspace, registers the client key on first use,
//! then encrypts and uploads the archive. The workspace is always removed
//! before [`SyncOrchestrator::sync`] returns.

pub mod archive;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod workspace;

pub use archive::{archive_name, archive_name_now, stdin_listing, ArchiveBuilder, ARCHIVE_EXTENSION};
pub use config::{BackupConfig, FilesConfig};
pub use error::{SyncError, SyncResult};
pub use orchestrator::{ArchiveKind, SyncOptions, SyncOrchestrator, SyncReport};
pub use resolver::{expand_pattern, resolve_patterns};
pub use workspace::{remove_rf, Workspace, WORKSPACE_PREFIX};
