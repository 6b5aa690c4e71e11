//! Glob pattern expansion.
//!
//! Each pattern is expanded on a blocking worker; results are joined in the
//! order the patterns were given, never in completion order. Matches from
//! overlapping patterns are kept as-is, so a path matched twice is listed
//! (and archived) twice.

use crate::error::{SyncError, SyncResult};
use futures::future::try_join_all;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Dotfiles are only matched by patterns that spell the dot out.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Expands `patterns` and concatenates the matches.
///
/// Relative patterns are evaluated against `working_dir` and yield paths
/// relative to it. An empty result is valid.
pub async fn resolve_patterns(working_dir: &Path, patterns: &[String]) -> SyncResult<Vec<PathBuf>> {
    let expansions = patterns.iter().map(|pattern| {
        let working_dir = working_dir.to_path_buf();
        let pattern = pattern.clone();
        async move {
            let label = pattern.clone();
            tokio::task::spawn_blocking(move || expand_pattern(&working_dir, &pattern))
                .await
                .map_err(|e| SyncError::Resolution(format!("{label:?}: worker failed: {e}")))?
        }
    });

    let files: Vec<PathBuf> = try_join_all(expansions)
        .await?
        .into_iter()
        .flatten()
        .collect();

    if files.is_empty() {
        warn!("No files matched!");
    } else {
        debug!("{} patterns matched {} files", patterns.len(), files.len());
    }
    Ok(files)
}

/// Expands a single pattern synchronously.
pub fn expand_pattern(working_dir: &Path, pattern: &str) -> SyncResult<Vec<PathBuf>> {
    let absolute = Path::new(pattern).is_absolute();
    let full = if absolute {
        pattern.to_string()
    } else {
        let base = Pattern::escape(&working_dir.to_string_lossy());
        format!("{}/{pattern}", base.trim_end_matches('/'))
    };

    let entries = glob::glob_with(&full, MATCH_OPTIONS)
        .map_err(|e| SyncError::Resolution(format!("invalid pattern {pattern:?}: {e}")))?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SyncError::Resolution(format!("{pattern:?}: {e}")))?;
        if absolute {
            matches.push(path);
            continue;
        }
        let relative = path.strip_prefix(working_dir).ok().map(Path::to_path_buf);
        matches.push(relative.unwrap_or(path));
    }
    Ok(matches)
}
