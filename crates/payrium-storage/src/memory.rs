//! In-memory [`SecureStore`] for tests and ephemeral sessions.
//!
//! The resident wallet lives in one `Option` behind a `std::sync::Mutex`;
//! a write swaps the whole value, so it is atomic by construction.
//! Clones share the same slot.

use std::sync::{Arc, Mutex, MutexGuard};

use payrium_types::{PayriumError, Result};

use crate::record::{EncryptedSecretRecord, PinCredential, StoredWallet, WalletMetadata};
use crate::store::SecureStore;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<StoredWallet>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_slot(&self) -> Result<MutexGuard<'_, Option<StoredWallet>>> {
        self.inner.lock().map_err(|e| PayriumError::PersistenceFailure {
            reason: format!("memory store lock poisoned: {e}"),
        })
    }
}

impl SecureStore for MemoryStore {
    fn exists(&self) -> bool {
        self.lock_slot().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn write(
        &self,
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Result<()> {
        let mut slot = self.lock_slot()?;
        *slot = Some(StoredWallet {
            record: record.clone(),
            metadata: metadata.clone(),
            credential: credential.clone(),
        });
        Ok(())
    }

    fn read(&self) -> Result<StoredWallet> {
        self.lock_slot()?.clone().ok_or(PayriumError::NoWalletFound)
    }

    fn erase(&self) -> Result<()> {
        *self.lock_slot()? = None;
        Ok(())
    }
}
