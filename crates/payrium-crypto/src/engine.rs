//! PIN-keyed sealing of wallet secrets.
//!
//! [`CryptoEngine`] ties the primitives together:
//!
//! ```text
//! salt  = 16 random bytes (fresh per encryption)
//! key   = PBKDF2-HMAC-SHA256(pin, salt, iterations)
//! nonce = 12 random bytes (fresh per encryption)
//! ct    = ChaCha20-Poly1305(key, nonce, plaintext, AAD)
//! ```
//!
//! The iteration count travels with the [`SealedSecret`] so records
//! written under an older setting still open after the default moves.

use payrium_types::{PayriumError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::aead::{decrypt_chacha20, encrypt_chacha20, generate_aead_nonce, AeadNonce};
use crate::hash::{hash_pin, verify_pin_hash};
use crate::kdf::{pbkdf2_derive_key, DerivedKey, KdfParams, SALT_LEN};

/// Associated data bound into every wallet ciphertext.
pub const WALLET_AAD: &[u8] = b"payrium-wallet-seed-v1";

/// Output of [`CryptoEngine::encrypt`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SealedSecret {
    /// Ciphertext with the 16-byte Poly1305 tag appended.
    pub ciphertext: Vec<u8>,
    /// PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: [u8; AeadNonce::LEN],
    /// PBKDF2 iteration count used to derive the key.
    pub iterations: u32,
}

/// Fast PIN hash plus its salt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PinHash {
    pub hash: [u8; 32],
    pub salt: [u8; SALT_LEN],
}

/// Stateless encryption engine parameterized by KDF cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct CryptoEngine {
    params: KdfParams,
}

impl CryptoEngine {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Returns the KDF parameters used for new encryptions.
    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Returns 16 fresh random bytes from the OS CSPRNG.
    pub fn generate_salt(&self) -> Result<[u8; SALT_LEN]> {
        let mut salt = [0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PayriumError::CryptoError {
                reason: format!("failed to generate salt: {e}"),
            })?;
        Ok(salt)
    }

    /// Derives the 32-byte encryption key for `pin` and `salt`.
    pub fn derive_key(&self, pin: &str, salt: &[u8], iterations: u32) -> Result<DerivedKey> {
        let params = KdfParams::new(iterations)?;
        pbkdf2_derive_key(pin.as_bytes(), salt, &params)
    }

    /// Seals `plaintext` under a key derived from `pin`.
    ///
    /// Every call draws a new salt and nonce, so sealing the same
    /// plaintext twice yields different ciphertexts.
    pub fn encrypt(&self, plaintext: &[u8], pin: &str) -> Result<SealedSecret> {
        let salt = self.generate_salt()?;
        let nonce = generate_aead_nonce()?;
        let key = self.derive_key(pin, &salt, self.params.iterations)?;
        let ciphertext = encrypt_chacha20(key.as_bytes(), &nonce, plaintext, WALLET_AAD)?;

        Ok(SealedSecret {
            ciphertext,
            salt,
            nonce: *nonce.as_bytes(),
            iterations: self.params.iterations,
        })
    }

    /// Opens a [`SealedSecret`] with `pin`.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::DecryptionFailure`] on a wrong PIN or a
    /// tampered record. A stored iteration count outside the accepted
    /// range is treated as tampering too and fails before any PBKDF2
    /// rounds run.
    pub fn decrypt(&self, sealed: &SealedSecret, pin: &str) -> Result<Zeroizing<Vec<u8>>> {
        let key = self
            .derive_key(pin, &sealed.salt, sealed.iterations)
            .map_err(|e| match e {
                PayriumError::ConfigError { reason } => PayriumError::DecryptionFailure { reason },
                other => other,
            })?;
        let nonce = AeadNonce::from_bytes(sealed.nonce);
        let plaintext = decrypt_chacha20(key.as_bytes(), &nonce, &sealed.ciphertext, WALLET_AAD)?;
        Ok(Zeroizing::new(plaintext))
    }

    /// Computes a fresh-salted fast verification hash of `pin`.
    pub fn hash_pin(&self, pin: &str) -> Result<PinHash> {
        let salt = self.generate_salt()?;
        Ok(PinHash {
            hash: hash_pin(pin, &salt),
            salt,
        })
    }

    /// Checks `pin` against a stored [`PinHash`] in constant time.
    pub fn verify_pin(&self, pin: &str, stored: &PinHash) -> bool {
        verify_pin_hash(pin, &stored.salt, &stored.hash)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
