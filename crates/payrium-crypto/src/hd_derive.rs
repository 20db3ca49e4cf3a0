//! BIP32 secp256k1 hierarchical deterministic key derivation.
//!
//! The wallet's public handle is the account address at the standard
//! BIP-44 Ethereum path:
//!
//! ```text
//! m/44'/60'/0'/0/0
//! ```
//!
//! The address is the last 20 bytes of `Keccak-256` over the 64-byte
//! uncompressed public key (SEC1 encoding without the `0x04` tag).
//! Every step is pure: the same seed always yields the same address.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use std::str::FromStr;

use bip32::{DerivationPath, XPrv};
use k256::ecdsa::VerifyingKey;
use payrium_types::{Address, PayriumError, Result};

use crate::hash::keccak256;
use crate::mnemonic::{mnemonic_to_seed, Bip39Seed, Mnemonic};

/// Default BIP-44 derivation path for the wallet's first account.
pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Derives the extended private key at `path` from a BIP39 seed.
///
/// The returned key zeroizes itself on drop.
///
/// # Errors
///
/// - [`PayriumError::ConfigError`] if the path is malformed.
/// - [`PayriumError::CryptoError`] if derivation fails (an invalid
///   child key, probability below 2^-127).
pub fn derive_secp256k1_key(seed: &Bip39Seed, path: &str) -> Result<XPrv> {
    let path = DerivationPath::from_str(path).map_err(|e| PayriumError::ConfigError {
        reason: format!("invalid derivation path '{path}': {e}"),
    })?;

    XPrv::derive_from_path(seed.as_bytes(), &path).map_err(|e| PayriumError::CryptoError {
        reason: format!("BIP32 derivation failed: {e}"),
    })
}

/// Converts a secp256k1 public key into its 20-byte account address.
pub fn public_key_to_address(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let digest = keccak256(&encoded.as_bytes()[1..]);

    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}

/// Derives the account address for a BIP39 seed at [`DERIVATION_PATH`].
pub fn derive_address_from_seed(seed: &Bip39Seed) -> Result<Address> {
    let xprv = derive_secp256k1_key(seed, DERIVATION_PATH)?;
    Ok(public_key_to_address(xprv.private_key().verifying_key()))
}

/// Derives the account address for a mnemonic (empty BIP39 passphrase).
pub fn derive_address(mnemonic: &Mnemonic) -> Result<Address> {
    let seed = mnemonic_to_seed(mnemonic, "")?;
    derive_address_from_seed(&seed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
