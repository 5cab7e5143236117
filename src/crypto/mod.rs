//! # Crypto
//!
//! Master key handling for the vault:
//!
//! - `shamir` - Shamir secret sharing over GF(2^8)
//! - `cipher` - ChaCha20-Poly1305 value envelopes (base64 of `nonce || ciphertext`)
//!
//! Shares and envelopes are plain strings so they can travel through JSON,
//! the CLI and the vault file without further encoding.

pub mod cipher;
pub mod shamir;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use cipher::{decrypt, encrypt, NONCE_SIZE};

/// Key size for ChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Crypto errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("invalid shares: {0}")]
    InvalidShares(String),

    #[error("invalid split parameters: {0}")]
    InvalidParameters(String),

    #[error("base64 decoding failed: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext too short")]
    CiphertextTooShort,

    /// The AEAD error is opaque; it is kept for `Debug` output
    #[error("encryption failed")]
    Encryption(chacha20poly1305::Error),

    #[error("decryption failed")]
    Decryption(chacha20poly1305::Error),

    #[error("decrypted value is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Vault master key, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_SIZE]);

impl MasterKey {
    /// Generate a new random master key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    /// Build a key from raw bytes (e.g. a combined Shamir secret)
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeySize`] if `bytes` is not exactly [`KEY_SIZE`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(**redacted**)")
    }
}

/// Split a master key into base64-encoded shares
///
/// # Errors
///
/// Propagates parameter validation errors from [`shamir::split`].
pub fn split_key(key: &MasterKey, parts: u8, threshold: u8) -> Result<Vec<String>, CryptoError> {
    let shares = shamir::split(key.as_bytes(), parts, threshold)?;
    Ok(shares.iter().map(|s| STANDARD.encode(s)).collect())
}

/// Combine base64-encoded shares back into a master key
///
/// # Errors
///
/// Fails if any share is not valid base64, if the shares are inconsistent,
/// or if the combined secret is not a 32-byte key.
pub fn combine_shares<S: AsRef<str>>(shares: &[S]) -> Result<MasterKey, CryptoError> {
    let decoded = shares
        .iter()
        .map(|s| STANDARD.decode(s.as_ref().trim()))
        .collect::<Result<Vec<_>, _>>()?;
    let mut secret = shamir::combine(&decoded)?;
    let key = MasterKey::from_slice(&secret);
    secret.zeroize();
    key
}
