//! storj-backup: archive files matched by glob patterns, encrypt the
//! archive and upload it to a Storj bucket.
//!
//! `RUST_LOG` controls verbosity (default `info`).

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use storj_backup_bridge::{BridgeClient, CredentialPaths};
use storj_backup_cli::{init_tracing, Cli, Commands};
use storj_backup_sync::{BackupConfig, SyncOptions, SyncOrchestrator};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Sync {
            config,
            now,
            data_dir,
            working_dir,
            tar,
        } => sync(config, now, data_dir, working_dir, tar).await,
    }
}

async fn sync(
    config_path: PathBuf,
    now: bool,
    data_dir: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    tar: PathBuf,
) -> anyhow::Result<()> {
    let config = BackupConfig::load(&config_path)
        .with_context(|| format!("Loading config file ({})", config_path.display()))?;

    if !now {
        info!(
            "Config {} is valid; pass --now to run the backup",
            config_path.display()
        );
        return Ok(());
    }

    let credentials = match data_dir {
        Some(dir) => CredentialPaths::new(dir),
        None => CredentialPaths::default_location()?,
    };
    let mut options = SyncOptions::new(credentials)?;
    if let Some(dir) = working_dir {
        options.working_dir = dir;
    }
    options.tar_program = tar;

    let client = BridgeClient::new(config.storj.bridge_url.clone())
        .context("Creating bridge client")?;
    let orchestrator = SyncOrchestrator::new(Arc::new(client), options);

    let report = orchestrator.sync(&config).await?;
    info!(
        "Backed up {} files in {} archive(s)",
        report.files.len(),
        report.uploads.len()
    );
    Ok(())
}
