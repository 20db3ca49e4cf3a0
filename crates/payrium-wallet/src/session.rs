//! The wallet lifecycle state machine.
//!
//! ```text
//!              create_wallet / import_wallet
//!   NoWallet ───────────────────────────────▶ PendingPin
//!      ▲                                          │ set_initial_pin
//!      │ reset / logout                           ▼
//!      └──────────────────────────────────────  Locked ──┐
//!                                                 ▲      │ unlock / export_seed
//!                                                 └──────┘ (seed returned once)
//! ```
//!
//! The status is read from the store on every call, so a wallet erased
//! by another handle on the same store is seen immediately. There is
//! no long-lived `Unlocked` state: a successful unlock hands the caller
//! a [`Seed`] for one operation and the session keeps nothing.
//!
//! Nothing secret (PINs, phrases, keys, salts, ciphertext) is ever
//! logged.

use payrium_crypto::checksum::to_checksum_address;
use payrium_crypto::engine::{CryptoEngine, PinHash, SealedSecret};
use payrium_crypto::kdf::KdfParams;
use payrium_crypto::mnemonic::WordCount;
use payrium_storage::{EncryptedSecretRecord, PinCredential, SecureStore, WalletMetadata};
use payrium_types::config::{normalize_display_name, WalletConfig};
use payrium_types::{Address, PayriumError, Result, Timestamp, WalletStatus};

use crate::seed::{self, Seed};

/// A seed staged by create/import, waiting for its first PIN.
struct PendingWallet {
    seed: Seed,
    address: Address,
}

/// Orchestrates seed handling, encryption and persistence for the one
/// wallet held by a [`SecureStore`].
pub struct WalletSession<S> {
    store: S,
    engine: CryptoEngine,
    config: WalletConfig,
    pending: Option<PendingWallet>,
}

impl<S: SecureStore> WalletSession<S> {
    /// Opens a session over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::ConfigError`] if `config` is invalid.
    pub fn new(store: S, config: WalletConfig) -> Result<Self> {
        config.validate()?;
        let engine = CryptoEngine::new(KdfParams::new(config.kdf_iterations)?);
        let session = Self {
            store,
            engine,
            config,
            pending: None,
        };
        tracing::debug!(status = %session.status(), "wallet session opened");
        Ok(session)
    }

    /// Opens a session with [`WalletConfig::default`].
    pub fn with_defaults(store: S) -> Result<Self> {
        Self::new(store, WalletConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Returns `true` if an encrypted wallet is persisted.
    pub fn has_wallet(&self) -> bool {
        self.store.exists()
    }

    pub fn status(&self) -> WalletStatus {
        if self.store.exists() {
            WalletStatus::Locked
        } else if self.pending.is_some() {
            WalletStatus::PendingPin
        } else {
            WalletStatus::NoWallet
        }
    }

    // -----------------------------------------------------------------------
    // Onboarding
    // -----------------------------------------------------------------------

    /// Generates a new recovery phrase and stages it until
    /// [`set_initial_pin`](Self::set_initial_pin).
    ///
    /// The returned seed is the caller's only chance to back it up.
    /// Calling again while a seed is staged replaces it.
    ///
    /// # Errors
    ///
    /// [`PayriumError::InvalidState`] if a wallet is already stored.
    pub fn create_wallet(&mut self) -> Result<Seed> {
        self.require_no_wallet("create a wallet")?;

        let count = WordCount::from_words(self.config.word_count).ok_or_else(|| {
            PayriumError::ConfigError {
                reason: format!("unsupported word count {}", self.config.word_count),
            }
        })?;
        let seed = seed::generate_with(count)?;
        let address = seed::derive_address(&seed)?;
        let shown = seed.duplicate()?;

        self.pending = Some(PendingWallet { seed, address });
        tracing::info!(%address, words = count.words(), "recovery phrase generated");
        Ok(shown)
    }

    /// Validates `phrase` and stages it until
    /// [`set_initial_pin`](Self::set_initial_pin).
    ///
    /// # Errors
    ///
    /// - [`PayriumError::InvalidState`] if a wallet is already stored.
    /// - [`PayriumError::InvalidMnemonic`] if the phrase is rejected.
    ///   Any previously staged seed is kept.
    pub fn import_wallet(&mut self, phrase: &str) -> Result<Address> {
        self.require_no_wallet("import a wallet")?;

        let seed = seed::import_from(phrase).map_err(|e| {
            tracing::info!("recovery phrase rejected");
            e
        })?;
        let address = seed::derive_address(&seed)?;

        self.pending = Some(PendingWallet { seed, address });
        tracing::info!(%address, "recovery phrase imported");
        Ok(address)
    }

    /// Encrypts the staged seed under `pin` and persists the wallet.
    ///
    /// On success the staged seed is dropped and the status becomes
    /// [`WalletStatus::Locked`]. On failure the seed stays staged so the
    /// caller can retry.
    ///
    /// # Errors
    ///
    /// - [`PayriumError::InvalidState`] if nothing is staged or a wallet
    ///   is already stored.
    /// - [`PayriumError::WeakPin`] if the PIN format is rejected.
    /// - [`PayriumError::PersistenceFailure`] if the write fails.
    pub fn set_initial_pin(&mut self, pin: &str) -> Result<Address> {
        self.require_no_wallet("set an initial PIN")?;
        let pending = self.pending.as_ref().ok_or_else(|| PayriumError::InvalidState {
            reason: "no recovery phrase staged; create or import a wallet first".into(),
        })?;
        self.config.check_pin_format(pin)?;

        let address_text = to_checksum_address(&pending.address);
        let sealed = self.engine.encrypt(pending.seed.phrase().as_bytes(), pin)?;
        let pin_hash = self.engine.hash_pin(pin)?;

        let record = secret_record(sealed, address_text.clone());
        let metadata = WalletMetadata {
            address: address_text,
            created_at: Timestamp::now(),
            last_unlocked_at: None,
            name: normalize_display_name(&self.config.default_display_name)?,
        };
        self.store
            .write(&record, &metadata, &pin_credential(pin_hash))?;

        let address = pending.address;
        self.pending = None;
        tracing::info!(%address, "wallet created");
        Ok(address)
    }

    // -----------------------------------------------------------------------
    // PIN-gated access
    // -----------------------------------------------------------------------

    /// Fast PIN check against the stored hash. Never touches the
    /// ciphertext.
    ///
    /// # Errors
    ///
    /// [`PayriumError::NoWalletFound`] if nothing is stored.
    pub fn verify_pin(&self, pin: &str) -> Result<bool> {
        let stored = self.store.read()?;
        Ok(self.pin_matches(pin, &stored.credential))
    }

    /// Decrypts and returns the seed for one use.
    ///
    /// Records the unlock time on a best-effort basis.
    ///
    /// # Errors
    ///
    /// - [`PayriumError::NoWalletFound`] if nothing is stored.
    /// - [`PayriumError::InvalidPin`] if the fast PIN check fails.
    /// - [`PayriumError::DecryptionFailure`] if the PIN hash matched but
    ///   the record does not open to the seed it describes.
    pub fn unlock(&self, pin: &str) -> Result<Seed> {
        self.open_seed(pin, "unlock")
    }

    /// Same contract as [`unlock`](Self::unlock), for showing the
    /// recovery phrase again. The result is never cached.
    pub fn export_seed(&self, pin: &str) -> Result<Seed> {
        self.open_seed(pin, "export")
    }

    /// Re-encrypts the seed under `new_pin` with a fresh salt and nonce.
    ///
    /// The new record, credential and unchanged metadata are persisted
    /// in one write. Any failure before that write leaves the stored
    /// wallet untouched.
    ///
    /// # Errors
    ///
    /// - [`PayriumError::WeakPin`] if `new_pin` is rejected.
    /// - Everything [`unlock`](Self::unlock) returns for `current_pin`.
    /// - [`PayriumError::PersistenceFailure`] if the write fails.
    pub fn change_pin(&self, current_pin: &str, new_pin: &str) -> Result<()> {
        self.config.check_pin_format(new_pin)?;

        let stored = self.store.read()?;
        if !self.pin_matches(current_pin, &stored.credential) {
            tracing::info!(operation = "change-pin", "PIN rejected");
            return Err(PayriumError::InvalidPin);
        }
        let seed = self
            .decrypt_seed(current_pin, &stored.record)
            .map_err(|e| log_open_failure("change-pin", e))?;

        let sealed = self.engine.encrypt(seed.phrase().as_bytes(), new_pin)?;
        let pin_hash = self.engine.hash_pin(new_pin)?;
        let record = secret_record(sealed, stored.record.address.clone());

        self.store
            .write(&record, &stored.metadata, &pin_credential(pin_hash))?;
        tracing::info!(address = %stored.record.address, "PIN changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Returns the stored wallet's address, or the staged one while a
    /// PIN is pending, or `None`.
    pub fn get_address(&self) -> Result<Option<Address>> {
        match self.store.read() {
            Ok(stored) => stored
                .metadata
                .address
                .parse()
                .map(Some)
                .map_err(|e| PayriumError::PersistenceFailure {
                    reason: format!("stored address is malformed: {e}"),
                }),
            Err(PayriumError::NoWalletFound) => Ok(self.pending.as_ref().map(|p| p.address)),
            Err(e) => Err(e),
        }
    }

    /// Returns the stored metadata, or `None` when no wallet is stored.
    pub fn get_metadata(&self) -> Result<Option<WalletMetadata>> {
        match self.store.read() {
            Ok(stored) => Ok(Some(stored.metadata)),
            Err(PayriumError::NoWalletFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Changes the display name. Needs no PIN: the name is not secret.
    ///
    /// # Errors
    ///
    /// - [`PayriumError::ConfigError`] for an empty or over-long name.
    /// - [`PayriumError::NoWalletFound`] if nothing is stored.
    pub fn rename(&self, name: &str) -> Result<WalletMetadata> {
        let name = normalize_display_name(name)?;
        let stored = self.store.read()?;
        let metadata = WalletMetadata {
            name,
            ..stored.metadata
        };
        self.store
            .write(&stored.record, &metadata, &stored.credential)?;
        tracing::info!(name = %metadata.name, "wallet renamed");
        Ok(metadata)
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Erases the stored wallet and drops any staged seed. Valid from
    /// every state.
    pub fn reset(&mut self) -> Result<()> {
        self.pending = None;
        self.store.erase()?;
        tracing::info!("wallet reset");
        Ok(())
    }

    /// Alias of [`reset`](Self::reset). There is no session to end
    /// separately; logging out forgets the wallet on this device.
    pub fn logout(&mut self) -> Result<()> {
        self.reset()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_no_wallet(&self, action: &str) -> Result<()> {
        if self.store.exists() {
            return Err(PayriumError::InvalidState {
                reason: format!("cannot {action}: a wallet already exists"),
            });
        }
        Ok(())
    }

    fn pin_matches(&self, pin: &str, credential: &PinCredential) -> bool {
        let stored = PinHash {
            hash: credential.hash,
            salt: credential.salt,
        };
        self.engine.verify_pin(pin, &stored)
    }

    fn open_seed(&self, pin: &str, operation: &'static str) -> Result<Seed> {
        let stored = self.store.read()?;
        if !self.pin_matches(pin, &stored.credential) {
            tracing::info!(operation, "PIN rejected");
            return Err(PayriumError::InvalidPin);
        }

        let seed = self
            .decrypt_seed(pin, &stored.record)
            .map_err(|e| log_open_failure(operation, e))?;

        if let Err(e) = self.store.touch_last_unlocked(Timestamp::now()) {
            tracing::warn!(operation, error = %e, "failed to record unlock time");
        }
        tracing::info!(operation, address = %stored.record.address, "wallet opened");
        Ok(seed)
    }

    /// Full decrypt plus a check that the phrase still derives the
    /// address recorded next to it.
    fn decrypt_seed(&self, pin: &str, record: &EncryptedSecretRecord) -> Result<Seed> {
        let sealed = SealedSecret {
            ciphertext: record.ciphertext.clone(),
            salt: record.salt,
            nonce: record.nonce,
            iterations: record.iterations,
        };
        let plaintext = self.engine.decrypt(&sealed, pin)?;

        let phrase = std::str::from_utf8(&plaintext).map_err(|_| PayriumError::DecryptionFailure {
            reason: "decrypted secret is not UTF-8".into(),
        })?;
        let seed = seed::import_from(phrase).map_err(|_| PayriumError::DecryptionFailure {
            reason: "decrypted secret is not a valid recovery phrase".into(),
        })?;

        let expected: Address =
            record
                .address
                .parse()
                .map_err(|_| PayriumError::DecryptionFailure {
                    reason: "stored address is malformed".into(),
                })?;
        if seed::derive_address(&seed)? != expected {
            return Err(PayriumError::DecryptionFailure {
                reason: "decrypted seed does not match the stored address".into(),
            });
        }

        Ok(seed)
    }
}

fn secret_record(sealed: SealedSecret, address: String) -> EncryptedSecretRecord {
    EncryptedSecretRecord {
        ciphertext: sealed.ciphertext,
        salt: sealed.salt,
        nonce: sealed.nonce,
        address,
        iterations: sealed.iterations,
    }
}

fn pin_credential(pin_hash: PinHash) -> PinCredential {
    PinCredential {
        hash: pin_hash.hash,
        salt: pin_hash.salt,
    }
}

/// The PIN hash already matched, so any failure here means the stored
/// record is damaged or out of sync.
fn log_open_failure(operation: &'static str, error: PayriumError) -> PayriumError {
    tracing::warn!(operation, error = %error, "PIN accepted but the stored secret did not open");
    error
}
