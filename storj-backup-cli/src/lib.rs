use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "storj-backup", version, about = "Encrypted file backups to a Storj bucket")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Archive, encrypt and upload the files named in a config file
    Sync {
        /// Path to the JSON backup config
        config: PathBuf,
        /// Run the backup now; without this the config is only checked
        #[arg(short, long)]
        now: bool,
        /// Directory holding the private key and keyring [default: ~/.storj-backup]
        #[arg(long, env = "STORJ_BACKUP_HOME")]
        data_dir: Option<PathBuf>,
        /// Directory relative patterns are resolved against [default: current dir]
        #[arg(long)]
        working_dir: Option<PathBuf>,
        /// tar executable used for compression
        #[arg(long, default_value = "tar")]
        tar: PathBuf,
    },
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
