//! Backup confirmation state machine.
//!
//! A freshly generated (or exported) recovery phrase is shown once and
//! then typed back before onboarding continues:
//!
//! ```text
//! ShowMnemonic → ConfirmMnemonic → Complete
//! ```
//!
//! The phrase is readable only in [`BackupState::ShowMnemonic`] and is
//! zeroized on completion and on drop.

use payrium_crypto::mnemonic::normalize_phrase;
use payrium_types::{PayriumError, Result};
use zeroize::Zeroize;

use crate::seed::Seed;

/// States of the backup flow.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackupState {
    /// The phrase is available for display.
    ShowMnemonic,
    /// The user has seen the phrase; awaiting it typed back.
    ConfirmMnemonic,
    /// Confirmed. The phrase is gone.
    Complete,
}

/// Walks the user through writing down a recovery phrase.
pub struct BackupFlow {
    state: BackupState,
    phrase: String,
}

impl Drop for BackupFlow {
    fn drop(&mut self) {
        self.phrase.zeroize();
    }
}

impl BackupFlow {
    /// Starts a flow in [`BackupState::ShowMnemonic`] over a copy of
    /// `seed`'s phrase.
    pub fn new(seed: &Seed) -> Self {
        Self {
            state: BackupState::ShowMnemonic,
            phrase: seed.phrase().to_owned(),
        }
    }

    pub fn state(&self) -> BackupState {
        self.state
    }

    /// Returns the phrase for display.
    ///
    /// # Errors
    ///
    /// [`PayriumError::InvalidState`] outside
    /// [`BackupState::ShowMnemonic`].
    pub fn mnemonic(&self) -> Result<&str> {
        if self.state != BackupState::ShowMnemonic {
            return Err(PayriumError::InvalidState {
                reason: "recovery phrase is only shown before acknowledgement".into(),
            });
        }
        Ok(&self.phrase)
    }

    /// Records that the user has seen the phrase.
    pub fn acknowledge_shown(&mut self) -> Result<()> {
        if self.state != BackupState::ShowMnemonic {
            return Err(PayriumError::InvalidState {
                reason: "can only acknowledge from ShowMnemonic state".into(),
            });
        }
        self.state = BackupState::ConfirmMnemonic;
        Ok(())
    }

    /// Compares the typed-back phrase to the original after
    /// normalization (case and whitespace are ignored).
    ///
    /// # Errors
    ///
    /// - [`PayriumError::InvalidState`] outside
    ///   [`BackupState::ConfirmMnemonic`].
    /// - [`PayriumError::InvalidMnemonic`] if the words differ. The flow
    ///   stays in `ConfirmMnemonic` so the user can try again.
    pub fn confirm(&mut self, words: &str) -> Result<()> {
        if self.state != BackupState::ConfirmMnemonic {
            return Err(PayriumError::InvalidState {
                reason: "can only confirm from ConfirmMnemonic state".into(),
            });
        }

        let entered = normalize_phrase(words);
        if entered.as_str() != self.phrase {
            return Err(PayriumError::InvalidMnemonic {
                reason: "confirmation words do not match the recovery phrase".into(),
            });
        }

        self.phrase.zeroize();
        self.state = BackupState::Complete;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.state == BackupState::Complete
    }
}
