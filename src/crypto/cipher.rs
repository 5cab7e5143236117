//! ChaCha20-Poly1305 envelopes for vault values.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;

use super::{CryptoError, MasterKey};

/// Nonce size for ChaCha20-Poly1305 (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Encrypt `plaintext` under `key`
///
/// Returns base64 of `nonce || ciphertext || tag`. A fresh random nonce is
/// drawn for every call.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] if the AEAD rejects the input.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> Result<String, CryptoError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));

    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(CryptoError::Encryption)?;

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(envelope))
}

/// Decrypt an envelope produced by [`encrypt`]
///
/// # Errors
///
/// Fails on malformed base64, short input, authentication failure (wrong key
/// or tampered data) or non-UTF-8 plaintext.
pub fn decrypt(key: &MasterKey, envelope: &str) -> Result<String, CryptoError> {
    let raw = STANDARD.decode(envelope)?;
    if raw.len() < NONCE_SIZE {
        return Err(CryptoError::CiphertextTooShort);
    }
    let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(CryptoError::Decryption)?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = MasterKey::generate();
        for plaintext in ["hello world", "", "Grüße, мир!"] {
            let envelope = encrypt(&key, plaintext.as_bytes()).unwrap();
            assert_eq!(decrypt(&key, &envelope).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_nonce_differs_per_encryption() {
        let key = MasterKey::generate();
        let a = encrypt(&key, b"same").unwrap();
        let b = encrypt(&key, b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = MasterKey::generate();
        let key2 = MasterKey::generate();
        let envelope = encrypt(&key1, b"Secret message").unwrap();

        assert!(matches!(
            decrypt(&key2, &envelope),
            Err(CryptoError::Decryption(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = MasterKey::generate();
        let envelope = encrypt(&key, b"Secret message").unwrap();
        let mut raw = STANDARD.decode(&envelope).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;

        assert!(decrypt(&key, &STANDARD.encode(raw)).is_err());
    }

    #[test]
    fn test_short_ciphertext_fails() {
        let key = MasterKey::generate();
        let short = STANDARD.encode([0u8; 4]);
        assert!(matches!(
            decrypt(&key, &short),
            Err(CryptoError::CiphertextTooShort)
        ));
    }
}
