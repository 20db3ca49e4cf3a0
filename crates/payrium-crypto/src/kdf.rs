//! PBKDF2-HMAC-SHA256 key derivation for PIN-based seed encryption.
//!
//! Derives a 256-bit encryption key from a user PIN and a random
//! 16-byte salt. The iteration count is deliberately high so that
//! brute-forcing a short numeric PIN against a stolen record is slow.
//! Keys are recomputed on every call and never cached.

use hmac::Hmac;
use payrium_types::config::{MAX_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use payrium_types::{PayriumError, Result};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// KdfParams
// ---------------------------------------------------------------------------

/// Tuning parameters for PBKDF2-HMAC-SHA256.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KdfParams {
    /// Number of PBKDF2 rounds, within
    /// [`MIN_KDF_ITERATIONS`]`..=`[`MAX_KDF_ITERATIONS`].
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: MIN_KDF_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Creates parameters with the given iteration count.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::ConfigError`] if `iterations` is outside
    /// [`MIN_KDF_ITERATIONS`]`..=`[`MAX_KDF_ITERATIONS`].
    pub fn new(iterations: u32) -> Result<Self> {
        let params = Self { iterations };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&self.iterations) {
            return Err(PayriumError::ConfigError {
                reason: format!(
                    "PBKDF2 iterations must be between {MIN_KDF_ITERATIONS} and \
                     {MAX_KDF_ITERATIONS}, got {}",
                    self.iterations
                ),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DerivedKey
// ---------------------------------------------------------------------------

/// 256-bit key derived by PBKDF2.
///
/// Automatically zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    /// Fixed byte length of the derived key.
    pub const LEN: usize = 32;

    /// Returns the raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

// DerivedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Required salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derives a 256-bit key from a PIN and salt using PBKDF2-HMAC-SHA256.
///
/// # Errors
///
/// - [`PayriumError::ConfigError`] if the salt is not [`SALT_LEN`]
///   bytes or the iteration count is out of range. Both are checked
///   before any rounds run.
/// - [`PayriumError::CryptoError`] if the PBKDF2 computation fails.
pub fn pbkdf2_derive_key(pin: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    if salt.len() != SALT_LEN {
        return Err(PayriumError::ConfigError {
            reason: format!("salt must be {SALT_LEN} bytes, got {}", salt.len()),
        });
    }
    params.validate()?;

    let mut output = [0u8; 32];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(pin, salt, params.iterations, &mut output).map_err(|e| {
        PayriumError::CryptoError {
            reason: format!("PBKDF2-HMAC-SHA256 failed: {e}"),
        }
    })?;

    Ok(DerivedKey(output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
