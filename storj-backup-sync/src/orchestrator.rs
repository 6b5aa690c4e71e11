//! The sync pipeline.
//!
//! One run: create a workspace, resolve patterns, compress, make sure the
//! client key is registered, encrypt and upload, then remove the workspace
//! whatever happened before.

use crate::archive::{archive_name_now, ArchiveBuilder};
use crate::config::BackupConfig;
use crate::error::{SyncError, SyncResult};
use crate::resolver::resolve_patterns;
use crate::workspace::Workspace;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storj_backup_bridge::{
    BridgeApi, CredentialBootstrapper, CredentialPaths, EncryptedUploader, UploadedFile,
};
use tracing::{debug, info, warn};

/// Kinds of archive a run can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    Files,
}

impl ArchiveKind {
    /// Base of the archive file name.
    pub fn label(&self) -> &'static str {
        match self {
            ArchiveKind::Files => "files",
        }
    }
}

/// Where a run reads from and writes to.
#[derive(Clone, Debug)]
pub struct SyncOptions {
    /// Parent of the per-run workspace.
    pub temp_root: PathBuf,
    /// Relative patterns are resolved against this.
    pub working_dir: PathBuf,
    pub credentials: CredentialPaths,
    pub tar_program: PathBuf,
}

impl SyncOptions {
    /// System temp dir, current dir and `tar` from `PATH`.
    pub fn new(credentials: CredentialPaths) -> SyncResult<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| SyncError::Config(format!("cannot determine working directory: {e}")))?;
        Ok(Self {
            temp_root: std::env::temp_dir(),
            working_dir,
            credentials,
            tar_program: PathBuf::from("tar"),
        })
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct SyncReport {
    pub archive_name: String,
    /// Already removed when the report is returned.
    pub workspace: PathBuf,
    pub files: Vec<PathBuf>,
    /// Empty when no pattern matched anything.
    pub uploads: Vec<UploadedFile>,
}

pub struct SyncOrchestrator {
    options: SyncOptions,
    archiver: ArchiveBuilder,
    bootstrapper: CredentialBootstrapper,
    uploader: EncryptedUploader,
}

impl SyncOrchestrator {
    pub fn new(api: Arc<dyn BridgeApi>, options: SyncOptions) -> Self {
        let archiver = ArchiveBuilder::new(options.tar_program.clone());
        let bootstrapper = CredentialBootstrapper::new(api.clone(), options.credentials.clone());
        let uploader = EncryptedUploader::new(api, options.credentials.clone());
        Self {
            options,
            archiver,
            bootstrapper,
            uploader,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Runs one backup.
    ///
    /// The workspace is removed on every path once it exists. If a stage
    /// failed, that error is returned and a teardown failure is only logged.
    /// Returned errors are not logged here; that is left to the caller.
    pub async fn sync(&self, config: &BackupConfig) -> SyncResult<SyncReport> {
        config.validate()?;

        let archive_name = archive_name_now(ArchiveKind::Files.label());
        let workspace = Workspace::create(&self.options.temp_root).await?;
        let workspace_path = workspace.path().to_path_buf();

        let outcome = self.run_stages(config, workspace.path(), &archive_name).await;
        let teardown = workspace.destroy().await;
        let (files, uploads) = settle(outcome, teardown)?;

        info!("Successfully done");
        Ok(SyncReport {
            archive_name,
            workspace: workspace_path,
            files,
            uploads,
        })
    }

    async fn run_stages(
        &self,
        config: &BackupConfig,
        workspace: &Path,
        archive_name: &str,
    ) -> SyncResult<(Vec<PathBuf>, Vec<UploadedFile>)> {
        let files = resolve_patterns(&self.options.working_dir, &config.files.paths).await?;

        let mut jobs = Vec::new();
        if files.is_empty() {
            debug!("nothing to archive, skipping compression");
        } else {
            self.archiver
                .compress(
                    &self.options.working_dir,
                    &files,
                    &workspace.join(archive_name),
                )
                .await?;
            jobs.push(archive_name.to_string());
        }

        self.options
            .credentials
            .ensure_data_dir()
            .await
            .map_err(SyncError::Bootstrap)?;
        self.bootstrapper
            .ensure(&config.storj)
            .await
            .map_err(SyncError::Bootstrap)?;

        let uploads = self.upload_all(config, workspace, jobs).await?;
        Ok((files, uploads))
    }

    async fn upload_all(
        &self,
        config: &BackupConfig,
        workspace: &Path,
        jobs: Vec<String>,
    ) -> SyncResult<Vec<UploadedFile>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let keyring = self
            .uploader
            .open_keyring(&config.storj)
            .await
            .map_err(SyncError::Upload)?;
        let keyring = &keyring;

        let concurrency = config.storj.concurrency.max(1);
        stream::iter(jobs)
            .map(|name| async move {
                self.uploader
                    .upload(&config.storj, keyring, workspace, &name)
                    .await
                    .map_err(SyncError::Upload)
            })
            .buffer_unordered(concurrency)
            .try_collect()
            .await
    }
}

/// Combines a run's outcome with the workspace teardown result.
///
/// A stage error always wins; a teardown error is only returned when every
/// stage succeeded.
fn settle<T>(outcome: SyncResult<T>, teardown: SyncResult<()>) -> SyncResult<T> {
    match (outcome, teardown) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(teardown_err)) => {
            warn!("workspace cleanup also failed: {teardown_err}");
            Err(e)
        }
    }
}
