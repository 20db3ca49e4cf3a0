//! The [`SecureStore`] abstraction.
//!
//! A store holds at most one wallet. Every write replaces the whole
//! composite record so a reader never observes a mix of old and new
//! fields.

use payrium_types::{Result, Timestamp};

use crate::record::{EncryptedSecretRecord, PinCredential, StoredWallet, WalletMetadata};

/// Persistence backend for the single resident wallet.
pub trait SecureStore: Send + Sync {
    /// Returns `true` if a wallet record occupies the store.
    ///
    /// The store only ever holds complete records, since `write`
    /// replaces everything at once. A file store whose file can no
    /// longer be parsed still reports `true`: `read` then fails with
    /// `PersistenceFailure`, and only `erase` frees the slot. A damaged
    /// or newer-format wallet is never silently overwritten by a
    /// fresh create or import.
    fn exists(&self) -> bool;

    /// Atomically persists all three records, replacing any prior wallet.
    ///
    /// # Errors
    ///
    /// Returns `PayriumError::PersistenceFailure` if the write does not
    /// complete. The previously stored wallet (if any) is then intact.
    fn write(
        &self,
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Result<()>;

    /// Reads the resident wallet.
    ///
    /// # Errors
    ///
    /// - `PayriumError::NoWalletFound` if nothing is stored.
    /// - `PayriumError::PersistenceFailure` if the stored data is
    ///   unreadable.
    fn read(&self) -> Result<StoredWallet>;

    /// Removes every persisted field. Erasing an empty store succeeds.
    fn erase(&self) -> Result<()>;

    /// Records a successful unlock as a read-modify-write of the whole
    /// record.
    fn touch_last_unlocked(&self, at: Timestamp) -> Result<()> {
        let stored = self.read()?;
        let metadata = WalletMetadata {
            last_unlocked_at: Some(at),
            ..stored.metadata
        };
        self.write(&stored.record, &metadata, &stored.credential)
    }
}

impl<S: SecureStore + ?Sized> SecureStore for std::sync::Arc<S> {
    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn write(
        &self,
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Result<()> {
        (**self).write(record, metadata, credential)
    }

    fn read(&self) -> Result<StoredWallet> {
        (**self).read()
    }

    fn erase(&self) -> Result<()> {
        (**self).erase()
    }

    fn touch_last_unlocked(&self, at: Timestamp) -> Result<()> {
        (**self).touch_last_unlocked(at)
    }
}
