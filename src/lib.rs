//! # passwort
//!
//! A small secrets system:
//!
//! - **vault** - encrypted key-value storage whose master key is split into
//!   Shamir shares and only held in memory while unsealed
//! - **server** - axum HTTP API over the vault (`passwort-server`)
//! - **client** - HTTP client and response rendering for `passwortctl`
//! - **crypto** - ChaCha20-Poly1305 envelopes and GF(2^8) Shamir sharing
//!
//! `decrypt-vault` reads a vault file offline using the same crypto.

pub mod client;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod observability;
pub mod server;
pub mod vault;
