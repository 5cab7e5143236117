//! # passwort-server
//!
//! HTTP secrets API over a sealable vault.
//!
//! ## Overview
//!
//! 1. **Configuration** - read from `PASSWORT_*` environment variables
//! 2. **Vault** - in-memory or file-backed, always starts sealed
//! 3. **API** - `/api/v1/secrets` and `/api/v1/sys/*`, bearer token protected
//! 4. **Probes and metrics** - `/healthz`, `/readyz`, `/metrics`
//!
//! `passwort-server init` initializes the configured vault, prints the key
//! shares and exits without serving. It requires the file backend, since an
//! in-memory vault would be gone by the time the shares are printed.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use passwort::config::{ServerConfig, StoreBackend};
use passwort::observability::init_tracing;
use passwort::server::{build_store, start_server};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "passwort-server", version)]
#[command(about = "passwort secrets API server", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<ServerCommand>,
}

#[derive(Debug, Subcommand)]
enum ServerCommand {
    /// Initialize the vault, print the key shares and exit
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("passwort=info,passwort_server=info");

    let args = Args::parse();
    let config = ServerConfig::from_env();
    info!(
        "Configuration: listen={}, store={:?}, shares={}, threshold={}",
        config.listen_addr, config.store, config.split.shares, config.split.threshold
    );

    if matches!(args.command, Some(ServerCommand::Init)) {
        ensure_persistent(&config)?;
    }

    let store = build_store(&config)
        .await
        .context("Failed to open the vault")?;

    match args.command {
        Some(ServerCommand::Init) => {
            let shares = store.init().await.context("Vault initialization failed")?;
            println!(
                "Distribute these shares securely. You need at least {} to unseal:",
                store.threshold()
            );
            for (i, share) in shares.iter().enumerate() {
                println!("Share {}: {}", i + 1, share);
            }
            Ok(())
        }
        None => start_server(config, store).await,
    }
}

/// Offline init only makes sense for a vault that outlives the process
fn ensure_persistent(config: &ServerConfig) -> Result<()> {
    if config.store != StoreBackend::File {
        bail!(
            "init needs a persistent vault: set PASSWORT_STORE=file \
             (an in-memory vault would be discarded on exit); \
             use POST /api/v1/sys/init on a running server instead"
        );
    }
    Ok(())
}
