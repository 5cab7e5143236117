//! # decrypt-vault
//!
//! Offline recovery: decrypt one entry of a vault file with key shares.
//!
//! ```bash
//! decrypt-vault vault.json <share1> <share2> [<share>...] <key>
//! ```
//!
//! Prints the plaintext on stdout. Any failure is logged and exits with 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use passwort::crypto::{combine_shares, decrypt};
use passwort::observability::init_tracing;
use passwort::vault::VaultFile;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "decrypt-vault", version)]
#[command(about = "Decrypt a single key from a vault file using key shares", long_about = None)]
struct Args {
    /// Vault JSON file
    vault: PathBuf,

    /// Key shares followed by the key to decrypt
    #[arg(required = true, num_args = 3.., value_name = "SHARE... KEY")]
    rest: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing("decrypt_vault=info,passwort=info");

    let args = Args::parse();
    match run(&args) {
        Ok(plaintext) => {
            println!("{plaintext}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let Some((key_name, shares)) = args.rest.split_last() else {
        anyhow::bail!("expected shares followed by a key name");
    };

    let raw = std::fs::read(&args.vault)
        .with_context(|| format!("Failed to read vault {}", args.vault.display()))?;
    let vault: VaultFile = serde_json::from_slice(&raw)
        .with_context(|| format!("Failed to parse vault {}", args.vault.display()))?;

    let key = combine_shares(shares).context("Failed to combine shares")?;

    let enc = vault
        .data
        .get(key_name)
        .with_context(|| format!("Key not found in vault: {key_name}"))?;
    let plaintext = decrypt(&key, enc).with_context(|| format!("Failed to decrypt {key_name}"))?;

    info!(key = %key_name, "Decryption succeeded");
    Ok(plaintext)
}
