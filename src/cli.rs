//! # passwortctl
//!
//! Command-line client for the passwort secrets API.
//!
//! Keeps the API URL, an auth token and a theme preference in a local
//! profile and sends one request per invocation, printing whatever the
//! server answered.
//!
//! ## Usage
//!
//! ```bash
//! # Store the URL and token once; they are used by every request afterwards
//! passwortctl profile set-url https://vault.internal:8080/api/v1
//! passwortctl token save s3cret
//!
//! passwortctl set db-password hunter2
//! passwortctl get db-password
//! passwortctl delete db-password
//!
//! # Vault lifecycle
//! passwortctl init
//! passwortctl unseal <share1> <share2>
//! passwortctl status
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use passwort::client::{render, RequestKind, SecretsClient};
use passwort::config::{default_profile_path, mask_token, ClientProfile, Theme};
use passwort::observability::init_tracing;

/// passwort secrets client
#[derive(Debug, Parser)]
#[command(name = "passwortctl", version)]
#[command(about = "Client for the passwort secrets API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Profile file (defaults to <config dir>/passwort/profile.json)
    #[arg(long, global = true, env = "PASSWORT_PROFILE")]
    profile: Option<PathBuf>,

    /// API base URL, overrides the profile
    #[arg(long, global = true, env = "PASSWORT_API_URL")]
    api_url: Option<String>,

    /// Auth token for this invocation, overrides the stored one
    #[arg(long, global = true, env = "PASSWORT_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the stored auth token
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
    /// Manage the light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
    /// Manage the stored API URL
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
    #[command(flatten)]
    Request(RequestCommand),
}

/// Commands that send one request to the API
#[derive(Debug, Subcommand)]
enum RequestCommand {
    /// Store a secret
    Set { key: String, value: String },
    /// Fetch a secret
    Get { key: String },
    /// Delete a secret
    Delete { key: String },
    /// List secret keys
    List,
    /// Initialize the vault and print the key shares
    Init,
    /// Seal the vault
    Seal,
    /// Unseal the vault with key shares
    Unseal {
        #[arg(required = true, num_args = 1..)]
        shares: Vec<String>,
    },
    /// Show whether the vault is sealed
    Status,
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Save the token to the profile
    Save { token: String },
    /// Print the stored token (masked)
    Show {
        /// Print the token verbatim
        #[arg(long)]
        reveal: bool,
    },
    /// Remove the stored token
    Clear,
}

#[derive(Debug, Subcommand)]
enum ThemeCommand {
    /// Switch between light and dark
    Toggle,
    /// Set the theme
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
    /// Print the current theme
    Show,
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    /// Save the API base URL, e.g. http://localhost:8080/api/v1
    SetUrl { url: String },
    /// Print the stored settings, token masked
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("passwortctl=warn,passwort=warn");

    let cli = Cli::parse();
    let profile_path = match cli.profile {
        Some(path) => path,
        None => default_profile_path()?,
    };
    let mut profile = ClientProfile::load(&profile_path)?;

    let output = match cli.command {
        Commands::Token { action } => token_command(action, &mut profile, &profile_path)?,
        Commands::Theme { action } => theme_command(action, &mut profile, &profile_path)?,
        Commands::Profile { action } => profile_command(action, &mut profile, &profile_path)?,
        Commands::Request(command) => {
            let api_url = cli.api_url.unwrap_or_else(|| profile.api_url.clone());
            let token = cli
                .token
                .unwrap_or_else(|| profile.token_or_empty().to_string());
            let client = SecretsClient::new(&api_url, token)?;
            request_command(&client, command).await
        }
    };
    println!("{output}");
    Ok(())
}

fn token_command(action: TokenCommand, profile: &mut ClientProfile, path: &Path) -> Result<String> {
    let output = match action {
        TokenCommand::Save { token } => {
            let masked = mask_token(&token);
            profile.auth_token = Some(token);
            profile.save(path).context("Failed to save token")?;
            format!("Token saved: {masked}")
        }
        TokenCommand::Show { reveal } => match profile.auth_token.as_deref() {
            Some(token) if reveal => token.to_string(),
            Some(token) => mask_token(token),
            None => "No token stored.".to_string(),
        },
        TokenCommand::Clear => {
            profile.auth_token = None;
            profile.save(path).context("Failed to clear token")?;
            "Token cleared.".to_string()
        }
    };
    Ok(output)
}

fn theme_command(action: ThemeCommand, profile: &mut ClientProfile, path: &Path) -> Result<String> {
    match action {
        ThemeCommand::Toggle => {
            profile.theme = profile.theme.toggled();
            profile.save(path).context("Failed to save theme")?;
        }
        ThemeCommand::Set { theme } => {
            profile.theme = theme;
            profile.save(path).context("Failed to save theme")?;
        }
        ThemeCommand::Show => {}
    }
    Ok(format!("{} {}", profile.theme.toggle_icon(), profile.theme))
}

fn profile_command(
    action: ProfileCommand,
    profile: &mut ClientProfile,
    path: &Path,
) -> Result<String> {
    match action {
        ProfileCommand::SetUrl { url } => {
            let url = url.trim_end_matches('/').to_string();
            // fail here rather than on the next request
            SecretsClient::new(&url, "").context("Invalid API URL")?;
            profile.api_url = url;
            profile.save(path).context("Failed to save API URL")?;
            Ok(format!("API URL saved: {}", profile.api_url))
        }
        ProfileCommand::Show => Ok(format!(
            "api_url: {}\ntoken: {}\ntheme: {}",
            profile.api_url,
            profile
                .auth_token
                .as_deref()
                .map_or_else(|| "(none)".to_string(), mask_token),
            profile.theme
        )),
    }
}

/// Send the request for `command` and render the outcome
async fn request_command(client: &SecretsClient, command: RequestCommand) -> String {
    match command {
        RequestCommand::Set { key, value } => {
            render(RequestKind::Set, client.set(&key, &value).await)
        }
        RequestCommand::Get { key } => render(RequestKind::Get, client.get(&key).await),
        RequestCommand::Delete { key } => render(RequestKind::Delete, client.delete(&key).await),
        RequestCommand::List => render(RequestKind::List, client.list().await),
        RequestCommand::Init => render(RequestKind::Init, client.init().await),
        RequestCommand::Seal => render(RequestKind::Seal, client.seal().await),
        RequestCommand::Unseal { shares } => {
            render(RequestKind::Unseal, client.unseal(&shares).await)
        }
        RequestCommand::Status => render(RequestKind::Status, client.status().await),
    }
}
