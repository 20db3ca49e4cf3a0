//! The three persisted wallet records and their composite.
//!
//! All three are written, replaced and erased together. None of them
//! holds plaintext secret material.

use payrium_types::Timestamp;

/// Salt length shared by the KDF salt and the PIN-hash salt.
pub const SALT_LEN: usize = 16;

/// AEAD nonce length.
pub const NONCE_LEN: usize = 12;

/// The encrypted recovery phrase plus what is needed to re-derive its key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedSecretRecord {
    /// ChaCha20-Poly1305 ciphertext with appended tag.
    pub ciphertext: Vec<u8>,
    /// PBKDF2 salt.
    pub salt: [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: [u8; NONCE_LEN],
    /// Checksummed address of the sealed phrase.
    pub address: String,
    /// PBKDF2 iteration count used when sealing.
    pub iterations: u32,
}

/// Fast PIN verification fingerprint.
///
/// Never an input to the encryption key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PinCredential {
    /// `SHA-256(pin || salt)`.
    pub hash: [u8; 32],
    pub salt: [u8; SALT_LEN],
}

/// Descriptive, non-secret wallet information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WalletMetadata {
    pub address: String,
    pub created_at: Timestamp,
    pub last_unlocked_at: Option<Timestamp>,
    /// User-facing display name.
    pub name: String,
}

/// One complete persisted wallet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredWallet {
    pub record: EncryptedSecretRecord,
    pub metadata: WalletMetadata,
    pub credential: PinCredential,
}
