//! Async facade over [`WalletSession`].
//!
//! PBKDF2 at wallet strength takes long enough to stall an executor
//! thread, so every operation runs on tokio's blocking pool. Dropping
//! a returned future does not cancel the work: the derivation runs to
//! completion and its result is discarded.

use std::sync::{Arc, Mutex};

use payrium_storage::{SecureStore, WalletMetadata};
use payrium_types::{Address, PayriumError, Result, WalletStatus};
use tokio::task;
use zeroize::Zeroizing;

use crate::seed::Seed;
use crate::session::WalletSession;

/// Cloneable handle sharing one [`WalletSession`].
pub struct AsyncWalletSession<S> {
    inner: Arc<Mutex<WalletSession<S>>>,
}

impl<S> Clone for AsyncWalletSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: SecureStore + 'static> AsyncWalletSession<S> {
    pub fn new(session: WalletSession<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Runs `op` against the session on the blocking pool.
    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut WalletSession<S>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        task::spawn_blocking(move || {
            let mut session = inner.lock().map_err(|e| PayriumError::InvalidState {
                reason: format!("wallet session lock poisoned: {e}"),
            })?;
            op(&mut session)
        })
        .await
        .map_err(|e| PayriumError::InvalidState {
            reason: format!("wallet task failed: {e}"),
        })?
    }

    pub async fn has_wallet(&self) -> Result<bool> {
        self.run(|s| Ok(s.has_wallet())).await
    }

    pub async fn status(&self) -> Result<WalletStatus> {
        self.run(|s| Ok(s.status())).await
    }

    pub async fn create_wallet(&self) -> Result<Seed> {
        self.run(|s| s.create_wallet()).await
    }

    pub async fn import_wallet(&self, phrase: &str) -> Result<Address> {
        let phrase = Zeroizing::new(phrase.to_owned());
        self.run(move |s| s.import_wallet(&phrase)).await
    }

    pub async fn set_initial_pin(&self, pin: &str) -> Result<Address> {
        let pin = Zeroizing::new(pin.to_owned());
        self.run(move |s| s.set_initial_pin(&pin)).await
    }

    pub async fn verify_pin(&self, pin: &str) -> Result<bool> {
        let pin = Zeroizing::new(pin.to_owned());
        self.run(move |s| s.verify_pin(&pin)).await
    }

    pub async fn unlock(&self, pin: &str) -> Result<Seed> {
        let pin = Zeroizing::new(pin.to_owned());
        self.run(move |s| s.unlock(&pin)).await
    }

    pub async fn export_seed(&self, pin: &str) -> Result<Seed> {
        let pin = Zeroizing::new(pin.to_owned());
        self.run(move |s| s.export_seed(&pin)).await
    }

    pub async fn change_pin(&self, current_pin: &str, new_pin: &str) -> Result<()> {
        let current = Zeroizing::new(current_pin.to_owned());
        let new = Zeroizing::new(new_pin.to_owned());
        self.run(move |s| s.change_pin(&current, &new)).await
    }

    pub async fn get_address(&self) -> Result<Option<Address>> {
        self.run(|s| s.get_address()).await
    }

    pub async fn get_metadata(&self) -> Result<Option<WalletMetadata>> {
        self.run(|s| s.get_metadata()).await
    }

    pub async fn rename(&self, name: &str) -> Result<WalletMetadata> {
        let name = name.to_owned();
        self.run(move |s| s.rename(&name)).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.run(|s| s.reset()).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.run(|s| s.logout()).await
    }
}
