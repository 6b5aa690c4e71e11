//! Archive naming and tar-based compression.
//!
//! Compression shells out to `tar` rather than writing the format itself.
//! File names are fed on stdin (`-T -`) so the list length is not bound by
//! the argument limit.

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Extension of every archive produced by the pipeline.
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// tar treats a listed name starting with `-` as an option unless it is
/// prefixed with this.
const ADD_FILE_PREFIX: &[u8] = b"--add-file=";

/// `<name>_<YYYY-MM-DDTHH-MM-SS>.tar.gz` for the given instant (UTC).
pub fn archive_name(name: &str, at: DateTime<Utc>) -> String {
    format!("{name}_{}{ARCHIVE_EXTENSION}", at.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn archive_name_now(name: &str) -> String {
    archive_name(name, Utc::now())
}

/// Builds the newline-separated file list written to tar's stdin.
pub fn stdin_listing(files: &[PathBuf]) -> Vec<u8> {
    let mut out = Vec::new();
    for file in files {
        let bytes = file.as_os_str().as_encoded_bytes();
        if bytes.first() == Some(&b'-') {
            out.extend_from_slice(ADD_FILE_PREFIX);
        }
        out.extend_from_slice(bytes);
        out.push(b'\n');
    }
    out
}

/// Runs tar to bundle files into a gzip-compressed archive.
#[derive(Clone, Debug)]
pub struct ArchiveBuilder {
    program: PathBuf,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new("tar")
    }
}

impl ArchiveBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// tar arguments for writing `output` from a stdin file list.
    pub fn args(output: &Path) -> Vec<OsString> {
        vec![
            "--no-recursion".into(),
            "--force-local".into(),
            "-z".into(),
            "-c".into(),
            "-f".into(),
            output.as_os_str().to_owned(),
            // Listed names are taken literally; backslashes are not escapes.
            "--no-unquote".into(),
            "-T".into(),
            "-".into(),
        ]
    }

    /// Compresses `files` (relative to `working_dir`) into `output`.
    ///
    /// tar's stderr is drained while it runs and every line is logged as a
    /// warning. Any non-zero exit is an error carrying the code.
    pub async fn compress(
        &self,
        working_dir: &Path,
        files: &[PathBuf],
        output: &Path,
    ) -> SyncResult<()> {
        info!(
            "Starting compression of {} files into {}",
            files.len(),
            output.display()
        );

        let mut command = Command::new(&self.program);
        command
            .args(Self::args(output))
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|e| {
            SyncError::Compression(format!("failed to spawn {}: {e}", self.program.display()))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SyncError::Compression("tar stdin not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SyncError::Compression("tar stderr not captured".into()))?;

        let drain = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!("tar: {line}");
            }
        });

        let listing = stdin_listing(files);
        match stdin.write_all(&listing).await {
            Ok(()) => {}
            // tar quit before reading everything; its exit code tells why.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("tar closed stdin early: {e}");
            }
            Err(e) => {
                return Err(SyncError::Compression(format!(
                    "failed to write file list to tar: {e}"
                )));
            }
        }
        drop(stdin);

        let status = child
            .wait()
            .await
            .map_err(|e| SyncError::Compression(format!("failed to wait for tar: {e}")))?;

        if let Err(e) = drain.await {
            debug!("tar stderr reader ended abnormally: {e}");
        }

        match status.code() {
            Some(0) => {
                info!("Successfully compressed");
                Ok(())
            }
            Some(code) => Err(SyncError::CompressionExit { code }),
            None => Err(SyncError::Compression(
                "tar was terminated by a signal".into(),
            )),
        }
    }
}
