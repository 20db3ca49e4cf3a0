//! SHA-256 / Keccak-256 digests and the fast PIN verification hash.
//!
//! The PIN hash is `SHA-256(pin || salt)`. It exists only to reject a
//! mistyped PIN before paying for a full key derivation; it is never
//! an input to the encryption key.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Computes the SHA-256 hash of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let result = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Computes the Keccak-256 hash (pre-standard SHA-3 padding, as used by
/// Ethereum-style addresses) of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let result = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Computes the fast PIN verification hash: `SHA-256(pin || salt)`.
pub fn hash_pin(pin: &str, salt: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(pin.as_bytes());
    hasher.update(salt);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Returns `true` if `hash_pin(pin, salt)` equals `expected`.
///
/// The comparison runs in constant time with respect to the hash
/// contents.
pub fn verify_pin_hash(pin: &str, salt: &[u8], expected: &[u8; 32]) -> bool {
    let computed = hash_pin(pin, salt);
    constant_time_eq(&computed, expected)
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
