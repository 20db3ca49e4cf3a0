//! Integration tests for payrium-wallet.
//!
//! Known-phrase tests use deterministic BIP39 vectors; generated
//! phrases only feed assertions that hold for any valid phrase.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use payrium_crypto::checksum::{is_valid_address, to_checksum_address};
use payrium_storage::{
    EncryptedSecretRecord, FileStore, MemoryStore, PinCredential, SecureStore, StoredWallet,
    WalletMetadata,
};
use payrium_types::config::WalletConfig;
use payrium_types::{PayriumError, Result, WalletStatus};
use payrium_wallet::backup::BackupFlow;
use payrium_wallet::{AsyncWalletSession, WalletSession};

// ---------------------------------------------------------------------------
// Test constants
// ---------------------------------------------------------------------------

/// BIP39 phrase from all-zero 128-bit entropy.
const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon \
                             abandon abandon abandon abandon abandon about";

/// Same phrase with the last word altered. "above" shares the entropy
/// bits of "about" but not its checksum.
const ABANDON_ABOVE: &str = "abandon abandon abandon abandon abandon abandon \
                             abandon abandon abandon abandon abandon above";

const ABANDON_ADDRESS: &str = "0x9858EfFD232B4033E47d90003D41EC34EcaEda94";

const TEST_JUNK: &str = "test test test test test test test test test test test junk";

const PIN: &str = "123456";
const NEW_PIN: &str = "654321";
const WRONG_PIN: &str = "000000";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Memory store whose writes can be made to fail on demand.
#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SecureStore for FlakyStore {
    fn exists(&self) -> bool {
        self.inner.exists()
    }

    fn write(
        &self,
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PayriumError::PersistenceFailure {
                reason: "injected write failure".into(),
            });
        }
        self.inner.write(record, metadata, credential)
    }

    fn read(&self) -> Result<StoredWallet> {
        self.inner.read()
    }

    fn erase(&self) -> Result<()> {
        self.inner.erase()
    }
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// RAII guard that removes a per-test temporary directory on drop.
struct TempDir(PathBuf);

impl TempDir {
    fn new(name: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "payrium_wallet_test_{name}_{}_{id}",
            std::process::id()
        ));
        let _ = std::fs::create_dir_all(&path);
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn memory_session() -> Result<WalletSession<MemoryStore>> {
    WalletSession::with_defaults(MemoryStore::new())
}

/// Session holding `phrase` under [`PIN`].
fn imported_session(phrase: &str) -> Result<WalletSession<MemoryStore>> {
    let mut session = memory_session()?;
    session.import_wallet(phrase)?;
    session.set_initial_pin(PIN)?;
    Ok(session)
}

fn overwrite<S: SecureStore>(store: &S, wallet: &StoredWallet) -> Result<()> {
    store.write(&wallet.record, &wallet.metadata, &wallet.credential)
}

// ---------------------------------------------------------------------------
// 1. Create → set PIN → unlock
// ---------------------------------------------------------------------------

#[test]
fn create_then_unlock_returns_same_words() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    let seed = session.create_wallet()?;
    assert_eq!(seed.word_count(), 12);

    let address = session.get_address()?.ok_or(PayriumError::NoWalletFound)?;
    assert!(is_valid_address(&to_checksum_address(&address)));

    session.set_initial_pin(PIN)?;
    assert_eq!(session.status(), WalletStatus::Locked);
    assert!(session.has_wallet());
    assert_eq!(session.get_address()?, Some(address));

    let unlocked = session.unlock(PIN)?;
    assert_eq!(unlocked.phrase(), seed.phrase());
    Ok(())
}

#[test]
fn import_known_phrase_gives_known_address() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    let address = session.import_wallet(ABANDON_ABOUT)?;
    assert_eq!(to_checksum_address(&address), ABANDON_ADDRESS);

    session.set_initial_pin(PIN)?;
    let stored = session.store().read()?;
    assert_eq!(stored.record.address, ABANDON_ADDRESS);
    assert_eq!(stored.metadata.address, ABANDON_ADDRESS);
    assert_eq!(stored.metadata.name, "Main Wallet");
    assert_eq!(stored.metadata.last_unlocked_at, None);
    assert_eq!(stored.record.iterations, 100_000);
    Ok(())
}

#[test]
fn stored_record_holds_no_plaintext() -> std::result::Result<(), PayriumError> {
    let session = imported_session(TEST_JUNK)?;
    let stored = session.store().read()?;
    let haystack = String::from_utf8_lossy(&stored.record.ciphertext);
    assert!(!haystack.contains("junk"));
    assert_eq!(stored.record.ciphertext.len(), TEST_JUNK.len() + 16);
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Wrong PIN
// ---------------------------------------------------------------------------

#[test]
fn wrong_pin_is_invalid_pin() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    assert!(matches!(session.unlock(WRONG_PIN), Err(PayriumError::InvalidPin)));
    assert!(matches!(
        session.export_seed(WRONG_PIN),
        Err(PayriumError::InvalidPin)
    ));
    Ok(())
}

#[test]
fn verify_pin_is_boolean() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    assert!(session.verify_pin(PIN)?);
    assert!(!session.verify_pin(WRONG_PIN)?);
    Ok(())
}

#[test]
fn wrong_pin_does_not_touch_metadata() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let _ = session.unlock(WRONG_PIN);
    let metadata = session.get_metadata()?.ok_or(PayriumError::NoWalletFound)?;
    assert_eq!(metadata.last_unlocked_at, None);
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Change PIN
// ---------------------------------------------------------------------------

#[test]
fn change_pin_swaps_credentials() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let before = session.store().read()?;

    session.change_pin(PIN, NEW_PIN)?;

    assert!(matches!(session.unlock(PIN), Err(PayriumError::InvalidPin)));
    assert_eq!(session.unlock(NEW_PIN)?.phrase(), ABANDON_ABOUT);

    let after = session.store().read()?;
    assert_ne!(after.record.salt, before.record.salt);
    assert_ne!(after.record.nonce, before.record.nonce);
    assert_ne!(after.credential, before.credential);
    assert_eq!(after.metadata.created_at, before.metadata.created_at);
    Ok(())
}

#[test]
fn change_pin_with_wrong_current_pin_rejected() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let before = session.store().read()?;
    assert!(matches!(
        session.change_pin(WRONG_PIN, NEW_PIN),
        Err(PayriumError::InvalidPin)
    ));
    assert_eq!(session.store().read()?, before);
    Ok(())
}

#[test]
fn change_pin_rejects_weak_new_pin() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    assert!(matches!(
        session.change_pin(PIN, "12ab"),
        Err(PayriumError::WeakPin { .. })
    ));
    assert_eq!(session.unlock(PIN)?.phrase(), ABANDON_ABOUT);
    Ok(())
}

#[test]
fn failed_change_pin_write_leaves_wallet_intact() -> std::result::Result<(), PayriumError> {
    let store = FlakyStore::default();
    let mut session = WalletSession::with_defaults(store.clone())?;
    session.import_wallet(ABANDON_ABOUT)?;
    session.set_initial_pin(PIN)?;
    let before = store.read()?;

    store.fail_writes(true);
    assert!(matches!(
        session.change_pin(PIN, NEW_PIN),
        Err(PayriumError::PersistenceFailure { .. })
    ));
    assert_eq!(store.read()?, before);

    // Old PIN still opens the wallet; the unlock-time update fails
    // quietly.
    assert_eq!(session.unlock(PIN)?.phrase(), ABANDON_ABOUT);
    assert!(matches!(session.unlock(NEW_PIN), Err(PayriumError::InvalidPin)));
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Import validation
// ---------------------------------------------------------------------------

#[test]
fn altered_last_word_is_invalid_mnemonic() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    assert!(matches!(
        session.import_wallet(ABANDON_ABOVE),
        Err(PayriumError::InvalidMnemonic { .. })
    ));
    assert_eq!(session.status(), WalletStatus::NoWallet);
    Ok(())
}

#[test]
fn import_rejects_wrong_word_count() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    assert!(matches!(
        session.import_wallet("abandon abandon abandon"),
        Err(PayriumError::InvalidMnemonic { .. })
    ));
    assert!(session.import_wallet("").is_err());
    Ok(())
}

#[test]
fn import_normalizes_phrase() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    session.import_wallet("  TEST test test  test test test test test test test test JUNK\n")?;
    session.set_initial_pin(PIN)?;
    assert_eq!(session.unlock(PIN)?.phrase(), TEST_JUNK);
    Ok(())
}

#[test]
fn create_or_import_over_existing_wallet_rejected() -> std::result::Result<(), PayriumError> {
    let mut session = imported_session(ABANDON_ABOUT)?;
    assert!(matches!(
        session.create_wallet(),
        Err(PayriumError::InvalidState { .. })
    ));
    assert!(matches!(
        session.import_wallet(TEST_JUNK),
        Err(PayriumError::InvalidState { .. })
    ));
    assert_eq!(session.unlock(PIN)?.phrase(), ABANDON_ABOUT);
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_forgets_wallet() -> std::result::Result<(), PayriumError> {
    let mut session = imported_session(ABANDON_ABOUT)?;
    session.reset()?;
    assert!(!session.has_wallet());
    assert_eq!(session.status(), WalletStatus::NoWallet);
    assert!(matches!(session.unlock(PIN), Err(PayriumError::NoWalletFound)));
    assert!(matches!(session.verify_pin(PIN), Err(PayriumError::NoWalletFound)));
    assert_eq!(session.get_address()?, None);

    // Reset is valid from every state, including an empty one.
    session.logout()?;
    Ok(())
}

#[test]
fn reimport_after_reset() -> std::result::Result<(), PayriumError> {
    let mut session = imported_session(ABANDON_ABOUT)?;
    session.reset()?;
    session.import_wallet(TEST_JUNK)?;
    session.set_initial_pin(NEW_PIN)?;
    assert_eq!(session.unlock(NEW_PIN)?.phrase(), TEST_JUNK);
    Ok(())
}

// ---------------------------------------------------------------------------
// Corruption and stale records
// ---------------------------------------------------------------------------

#[test]
fn tampered_ciphertext_is_decryption_failure() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let mut wallet = session.store().read()?;
    wallet.record.ciphertext[0] ^= 0x01;
    overwrite(session.store(), &wallet)?;

    // The fast check still passes; the authoritative decrypt does not.
    assert!(session.verify_pin(PIN)?);
    assert!(matches!(
        session.unlock(PIN),
        Err(PayriumError::DecryptionFailure { .. })
    ));
    Ok(())
}

#[test]
fn inflated_iteration_count_fails_fast() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let mut wallet = session.store().read()?;
    wallet.record.iterations = u32::MAX;
    overwrite(session.store(), &wallet)?;

    let started = std::time::Instant::now();
    for result in [session.unlock(PIN), session.export_seed(PIN)] {
        assert!(matches!(
            result,
            Err(PayriumError::DecryptionFailure { .. })
        ));
    }
    assert!(matches!(
        session.change_pin(PIN, NEW_PIN),
        Err(PayriumError::DecryptionFailure { .. })
    ));
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    Ok(())
}

#[test]
fn stale_pin_hash_is_decryption_failure() -> std::result::Result<(), PayriumError> {
    // Ciphertext sealed under PIN, hash for NEW_PIN: what a torn
    // multi-record write would leave behind.
    let old = imported_session(ABANDON_ABOUT)?.store().read()?;
    let changed = imported_session(ABANDON_ABOUT)?;
    changed.change_pin(PIN, NEW_PIN)?;
    let new = changed.store().read()?;

    let store = MemoryStore::new();
    store.write(&old.record, &old.metadata, &new.credential)?;
    let session = WalletSession::with_defaults(store)?;

    assert!(session.verify_pin(NEW_PIN)?);
    assert!(matches!(
        session.unlock(NEW_PIN),
        Err(PayriumError::DecryptionFailure { .. })
    ));
    assert!(matches!(session.unlock(PIN), Err(PayriumError::InvalidPin)));
    Ok(())
}

#[test]
fn address_mismatch_is_decryption_failure() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let mut wallet = session.store().read()?;
    wallet.record.address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into();
    overwrite(session.store(), &wallet)?;

    assert!(matches!(
        session.export_seed(PIN),
        Err(PayriumError::DecryptionFailure { .. })
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn same_phrase_and_pin_encrypt_differently() -> std::result::Result<(), PayriumError> {
    let a = imported_session(ABANDON_ABOUT)?.store().read()?;
    let b = imported_session(ABANDON_ABOUT)?.store().read()?;
    assert_ne!(a.record.ciphertext, b.record.ciphertext);
    assert_ne!(a.record.salt, b.record.salt);
    assert_ne!(a.credential.salt, b.credential.salt);
    assert_eq!(a.record.address, b.record.address);
    Ok(())
}

#[test]
fn unlock_and_export_record_unlock_time() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;

    session.unlock(PIN)?;
    let first = session
        .get_metadata()?
        .and_then(|m| m.last_unlocked_at)
        .ok_or(PayriumError::NoWalletFound)?;

    session.export_seed(PIN)?;
    let second = session
        .get_metadata()?
        .and_then(|m| m.last_unlocked_at)
        .ok_or(PayriumError::NoWalletFound)?;
    assert!(second >= first);
    Ok(())
}

#[test]
fn rename_updates_metadata_only() -> std::result::Result<(), PayriumError> {
    let session = imported_session(ABANDON_ABOUT)?;
    let before = session.store().read()?;

    let metadata = session.rename("  Savings ")?;
    assert_eq!(metadata.name, "Savings");

    let after = session.store().read()?;
    assert_eq!(after.metadata.name, "Savings");
    assert_eq!(after.record, before.record);
    assert_eq!(after.credential, before.credential);

    assert!(matches!(
        session.rename(" "),
        Err(PayriumError::ConfigError { .. })
    ));
    Ok(())
}

#[test]
fn twenty_four_word_wallets() -> std::result::Result<(), PayriumError> {
    let config = WalletConfig {
        word_count: 24,
        ..WalletConfig::default()
    };
    let mut session = WalletSession::new(MemoryStore::new(), config)?;
    let seed = session.create_wallet()?;
    assert_eq!(seed.word_count(), 24);
    session.set_initial_pin(PIN)?;
    assert_eq!(session.unlock(PIN)?.phrase(), seed.phrase());
    Ok(())
}

#[test]
fn backup_flow_over_created_seed() -> std::result::Result<(), PayriumError> {
    let mut session = memory_session()?;
    let seed = session.create_wallet()?;

    let mut flow = BackupFlow::new(&seed);
    let shown = flow.mnemonic()?.to_owned();
    flow.acknowledge_shown()?;
    flow.confirm(&shown.to_uppercase())?;
    assert!(flow.is_complete());

    session.set_initial_pin(PIN)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File-backed sessions
// ---------------------------------------------------------------------------

#[test]
fn file_wallet_survives_new_session() -> std::result::Result<(), PayriumError> {
    let dir = TempDir::new("reopen");
    {
        let mut session = WalletSession::with_defaults(FileStore::in_dir(dir.path()))?;
        session.import_wallet(ABANDON_ABOUT)?;
        session.set_initial_pin(PIN)?;
    }

    let mut session = WalletSession::with_defaults(FileStore::in_dir(dir.path()))?;
    assert_eq!(session.status(), WalletStatus::Locked);
    assert_eq!(session.unlock(PIN)?.phrase(), ABANDON_ABOUT);

    session.reset()?;
    assert!(!dir.path().join("wallet.json").exists());
    Ok(())
}

#[test]
fn unreadable_wallet_file_is_kept_until_reset() -> std::result::Result<(), PayriumError> {
    let dir = TempDir::new("unreadable");
    let path = dir.path().join("wallet.json");
    std::fs::write(&path, "{ \"version\": 7 }").map_err(|e| PayriumError::PersistenceFailure {
        reason: e.to_string(),
    })?;

    let mut session = WalletSession::with_defaults(FileStore::in_dir(dir.path()))?;
    assert_eq!(session.status(), WalletStatus::Locked);
    assert!(matches!(
        session.create_wallet(),
        Err(PayriumError::InvalidState { .. })
    ));
    assert!(matches!(
        session.import_wallet(ABANDON_ABOUT),
        Err(PayriumError::InvalidState { .. })
    ));
    assert!(matches!(
        session.unlock(PIN),
        Err(PayriumError::PersistenceFailure { .. })
    ));

    session.reset()?;
    assert_eq!(session.status(), WalletStatus::NoWallet);
    session.import_wallet(ABANDON_ABOUT)?;
    session.set_initial_pin(PIN)?;
    assert_eq!(session.unlock(PIN)?.phrase(), ABANDON_ABOUT);
    Ok(())
}

#[test]
fn pending_seed_is_never_written() -> std::result::Result<(), PayriumError> {
    let dir = TempDir::new("pending");
    let mut session = WalletSession::with_defaults(FileStore::in_dir(dir.path()))?;
    session.create_wallet()?;
    assert_eq!(session.status(), WalletStatus::PendingPin);
    assert!(!dir.path().join("wallet.json").exists());
    Ok(())
}

// ---------------------------------------------------------------------------
// Async facade
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_session_round_trip() -> std::result::Result<(), PayriumError> {
    let session = AsyncWalletSession::new(memory_session()?);
    assert_eq!(session.status().await?, WalletStatus::NoWallet);

    let address = session.import_wallet(ABANDON_ABOUT).await?;
    assert_eq!(session.status().await?, WalletStatus::PendingPin);
    session.set_initial_pin(PIN).await?;

    let handle = session.clone();
    assert!(handle.verify_pin(PIN).await?);
    assert_eq!(handle.unlock(PIN).await?.phrase(), ABANDON_ABOUT);
    assert!(matches!(
        handle.unlock(WRONG_PIN).await,
        Err(PayriumError::InvalidPin)
    ));

    session.change_pin(PIN, NEW_PIN).await?;
    assert_eq!(session.export_seed(NEW_PIN).await?.phrase(), ABANDON_ABOUT);
    assert_eq!(session.get_address().await?, Some(address));

    session.reset().await?;
    assert!(!session.has_wallet().await?);
    Ok(())
}
