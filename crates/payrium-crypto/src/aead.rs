//! ChaCha20-Poly1305 authenticated encryption with associated data.
//!
//! Seed ciphertexts are sealed with ChaCha20-Poly1305 under 96-bit
//! (12-byte) nonces drawn from OS entropy. A nonce **must never be
//! reused** with the same key; since every encryption also derives a
//! fresh key from a fresh salt, reuse is doubly excluded.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use payrium_types::{PayriumError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

// ---------------------------------------------------------------------------
// AeadNonce
// ---------------------------------------------------------------------------

/// 96-bit (12-byte) nonce for ChaCha20-Poly1305.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AeadNonce([u8; 12]);

impl AeadNonce {
    /// Fixed byte length of a ChaCha20-Poly1305 nonce.
    pub const LEN: usize = 12;

    /// Creates an [`AeadNonce`] from raw bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 12-byte array.
    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

/// Generates a fresh 96-bit random nonce from OS entropy.
///
/// # Errors
///
/// Returns [`PayriumError::CryptoError`] if the OS RNG is unavailable.
pub fn generate_aead_nonce() -> Result<AeadNonce> {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| PayriumError::CryptoError {
            reason: format!("failed to generate random nonce: {e}"),
        })?;
    Ok(AeadNonce(bytes))
}

// ---------------------------------------------------------------------------
// Encrypt / Decrypt
// ---------------------------------------------------------------------------

/// Encrypts `plaintext` with ChaCha20-Poly1305.
///
/// Returns the ciphertext with the 16-byte Poly1305 tag appended
/// (length = plaintext length + 16).
///
/// `aad` is authenticated but not encrypted. Pass `&[]` if unused.
pub fn encrypt_chacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload { msg: plaintext, aad };

    cipher
        .encrypt(Nonce::from_slice(&nonce.0), payload)
        .map_err(|e| PayriumError::CryptoError {
            reason: format!("ChaCha20-Poly1305 encryption failed: {e}"),
        })
}

/// Decrypts `ciphertext` (with appended tag) using ChaCha20-Poly1305.
///
/// Decryption is all-or-nothing: no plaintext is returned unless the
/// tag verifies.
///
/// # Errors
///
/// Returns [`PayriumError::DecryptionFailure`] if the tag verification
/// fails (wrong key, wrong nonce, tampered ciphertext, or wrong AAD).
pub fn decrypt_chacha20(
    key: &[u8; 32],
    nonce: &AeadNonce,
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    cipher
        .decrypt(Nonce::from_slice(&nonce.0), payload)
        .map_err(|e| PayriumError::DecryptionFailure {
            reason: format!("ChaCha20-Poly1305 authentication failed: {e}"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
