//! Persistence for the Payrium wallet.
//!
//! Exactly one wallet is resident at a time. Its three records (the
//! encrypted secret, the PIN credential and the metadata) are always
//! written, replaced and erased as one unit through [`SecureStore`].
//!
//! # Modules
//!
//! - [`record`]: the persisted record types
//! - [`store`]: the [`SecureStore`] trait
//! - [`memory`]: mutex-guarded in-memory store
//! - [`file`]: atomic JSON file store

pub mod file;
pub mod memory;
pub mod record;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use record::{EncryptedSecretRecord, PinCredential, StoredWallet, WalletMetadata};
pub use store::SecureStore;
