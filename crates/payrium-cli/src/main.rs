//! Payrium CLI.
//!
//! Creates, restores and manages the PIN-protected wallet stored in
//! `<data-dir>/wallet.json`.

mod commands;
mod config;
mod output;
mod prompt;

use std::path::PathBuf;

use clap::Parser;
use payrium_storage::FileStore;
use payrium_types::Result;
use payrium_wallet::{AsyncWalletSession, WalletSession};

use crate::commands::wallet::WalletCommand;
use crate::config::CliConfig;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Payrium: self-custody wallet key management.
#[derive(Parser)]
#[command(name = "payrium", version, about)]
struct Cli {
    /// Output in JSON format (no colors, machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding wallet.json (default: platform-specific).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Load settings from a JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: WalletCommand,
}

// ---------------------------------------------------------------------------
// Global options passed to every command handler
// ---------------------------------------------------------------------------

/// Shared options threaded into command handlers.
pub struct GlobalOpts {
    pub json: bool,
    pub config: CliConfig,
}

impl GlobalOpts {
    /// Opens a session over the configured wallet file.
    pub fn open_session(&self) -> Result<AsyncWalletSession<FileStore>> {
        let store = FileStore::new(self.config.wallet_path());
        let session = WalletSession::new(store, self.config.wallet.clone())?;
        Ok(AsyncWalletSession::new(session))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = match CliConfig::resolve(cli.config.as_deref(), cli.data_dir) {
        Ok(config) => {
            tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");
            let opts = GlobalOpts { json, config };
            commands::wallet::run(cli.command, &opts).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), json);
        std::process::exit(1);
    }
}
