//! Cryptographic primitives for the Payrium wallet.
//!
//! This crate is the **sole** location for all cryptographic operations.
//! No other crate in the workspace may perform raw crypto directly.
//!
//! # Modules
//!
//! - [`kdf`]: PBKDF2-HMAC-SHA256 PIN key derivation
//! - [`aead`]: ChaCha20-Poly1305 authenticated encryption/decryption
//! - [`hash`]: SHA-256, Keccak-256 and the fast PIN hash
//! - [`engine`]: PIN-keyed sealing of wallet secrets
//! - [`wordlist`]: BIP39 English wordlist lookups
//! - [`mnemonic`]: BIP39 generation, validation and seed derivation
//! - [`hd_derive`]: BIP32 secp256k1 derivation and account addresses
//! - [`checksum`]: EIP-55 address checksums and display helpers

pub mod aead;
pub mod checksum;
pub mod engine;
pub mod hash;
pub mod hd_derive;
pub mod kdf;
pub mod mnemonic;
pub mod wordlist;
