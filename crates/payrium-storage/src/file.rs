//! JSON file-backed [`SecureStore`].
//!
//! The wallet is one JSON document; binary fields are hex.
//!
//! # File format (v1)
//!
//! ```json
//! {
//!   "version": 1,
//!   "secretBlob": {
//!     "ciphertext": "<hex>",
//!     "salt": "<hex 16 bytes>",
//!     "nonce": "<hex 12 bytes>",
//!     "address": "0x…",
//!     "iterations": 100000
//!   },
//!   "pinRecord": { "hash": "<hex 32 bytes>", "salt": "<hex 16 bytes>" },
//!   "metadata": {
//!     "address": "0x…",
//!     "createdAt": 1700000000000,
//!     "lastUnlockedAt": null,
//!     "name": "Main Wallet"
//!   }
//! }
//! ```
//!
//! # Atomic write flow
//!
//! 1. Serialize the composite document.
//! 2. Write it to a hidden sibling temp file (mode `0600` on Unix).
//! 3. `fsync` the temp file.
//! 4. Rename it over the target.
//!
//! If any step fails, the original file is untouched.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use payrium_types::config::MIN_KDF_ITERATIONS;
use payrium_types::{PayriumError, Result, Timestamp};
use serde::{Deserialize, Serialize};

use crate::record::{
    EncryptedSecretRecord, PinCredential, StoredWallet, WalletMetadata, NONCE_LEN, SALT_LEN,
};
use crate::store::SecureStore;

/// Current on-disk format version.
pub const WALLET_FILE_VERSION: u32 = 1;

/// Default file name inside a data directory.
pub const WALLET_FILE_NAME: &str = "wallet.json";

// ---------------------------------------------------------------------------
// On-disk DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletDocument {
    version: u32,
    secret_blob: SecretBlobDto,
    pin_record: PinRecordDto,
    metadata: MetadataDto,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretBlobDto {
    ciphertext: String,
    salt: String,
    nonce: String,
    address: String,
    #[serde(default = "default_iterations")]
    iterations: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinRecordDto {
    hash: String,
    salt: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDto {
    address: String,
    created_at: Timestamp,
    #[serde(default)]
    last_unlocked_at: Option<Timestamp>,
    name: String,
}

fn default_iterations() -> u32 {
    MIN_KDF_ITERATIONS
}

impl WalletDocument {
    fn from_parts(
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Self {
        Self {
            version: WALLET_FILE_VERSION,
            secret_blob: SecretBlobDto {
                ciphertext: hex::encode(&record.ciphertext),
                salt: hex::encode(record.salt),
                nonce: hex::encode(record.nonce),
                address: record.address.clone(),
                iterations: record.iterations,
            },
            pin_record: PinRecordDto {
                hash: hex::encode(credential.hash),
                salt: hex::encode(credential.salt),
            },
            metadata: MetadataDto {
                address: metadata.address.clone(),
                created_at: metadata.created_at,
                last_unlocked_at: metadata.last_unlocked_at,
                name: metadata.name.clone(),
            },
        }
    }

    fn into_stored(self) -> Result<StoredWallet> {
        if self.version != WALLET_FILE_VERSION {
            return Err(PayriumError::PersistenceFailure {
                reason: format!(
                    "unsupported wallet file version {} (expected {WALLET_FILE_VERSION})",
                    self.version
                ),
            });
        }

        let ciphertext =
            hex::decode(&self.secret_blob.ciphertext).map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("invalid ciphertext hex: {e}"),
            })?;

        Ok(StoredWallet {
            record: EncryptedSecretRecord {
                ciphertext,
                salt: hex_decode_fixed::<SALT_LEN>(&self.secret_blob.salt, "salt")?,
                nonce: hex_decode_fixed::<NONCE_LEN>(&self.secret_blob.nonce, "nonce")?,
                address: self.secret_blob.address,
                iterations: self.secret_blob.iterations,
            },
            metadata: WalletMetadata {
                address: self.metadata.address,
                created_at: self.metadata.created_at,
                last_unlocked_at: self.metadata.last_unlocked_at,
                name: self.metadata.name,
            },
            credential: PinCredential {
                hash: hex_decode_fixed::<32>(&self.pin_record.hash, "pin hash")?,
                salt: hex_decode_fixed::<SALT_LEN>(&self.pin_record.salt, "pin salt")?,
            },
        })
    }
}

fn hex_decode_fixed<const N: usize>(hex_str: &str, field: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(hex_str).map_err(|e| PayriumError::PersistenceFailure {
        reason: format!("invalid {field} hex: {e}"),
    })?;
    if bytes.len() != N {
        return Err(PayriumError::PersistenceFailure {
            reason: format!("{field} must be {N} bytes, got {}", bytes.len()),
        });
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Flushes the directory entry of `path` so a completed rename
/// survives a crash. A no-op where directories cannot be opened.
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::File::open(parent)?.sync_all()?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Stores the wallet as a single JSON file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Uses `path` as the wallet file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `<dir>/wallet.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(WALLET_FILE_NAME))
    }

    /// Returns the wallet file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling temp path, hidden, in the same directory so the rename
    /// stays on one filesystem.
    fn tmp_path(&self) -> Result<PathBuf> {
        let parent = self.path.parent().ok_or_else(|| PayriumError::PersistenceFailure {
            reason: "wallet file path has no parent directory".into(),
        })?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(WALLET_FILE_NAME);

        Ok(parent.join(format!(".{file_name}.tmp")))
    }

    fn write_tmp(tmp_path: &Path, bytes: &[u8]) -> Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(tmp_path)
            .map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("failed to create temp wallet file: {e}"),
            })?;

        file.write_all(bytes)
            .map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("failed to write temp wallet file: {e}"),
            })?;

        file.sync_all()
            .map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("failed to fsync temp wallet file: {e}"),
            })
    }
}

impl SecureStore for FileStore {
    /// Presence of the wallet file, parseable or not.
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn write(
        &self,
        record: &EncryptedSecretRecord,
        metadata: &WalletMetadata,
        credential: &PinCredential,
    ) -> Result<()> {
        let document = WalletDocument::from_parts(record, metadata, credential);
        let json =
            serde_json::to_vec_pretty(&document).map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("JSON serialization failed: {e}"),
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PayriumError::PersistenceFailure {
                    reason: format!("failed to create wallet directory: {e}"),
                })?;
            }
        }

        let tmp_path = self.tmp_path()?;
        if let Err(e) = Self::write_tmp(&tmp_path, &json) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PayriumError::PersistenceFailure {
                reason: format!("failed to rename temp wallet file: {e}"),
            }
        })?;

        // The new record is already in place; a failed directory sync
        // only weakens durability across a power loss.
        if let Err(e) = sync_parent_dir(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to fsync wallet directory"
            );
        }

        tracing::debug!(path = %self.path.display(), "wallet record written");
        Ok(())
    }

    fn read(&self) -> Result<StoredWallet> {
        let json = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(PayriumError::NoWalletFound),
            Err(e) => {
                return Err(PayriumError::PersistenceFailure {
                    reason: format!("failed to read wallet file: {e}"),
                })
            }
        };

        let document: WalletDocument =
            serde_json::from_slice(&json).map_err(|e| PayriumError::PersistenceFailure {
                reason: format!("failed to parse wallet file: {e}"),
            })?;

        document.into_stored()
    }

    fn erase(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PayriumError::PersistenceFailure {
                    reason: format!("failed to remove wallet file: {e}"),
                })
            }
        }

        // A crash mid-write can leave a stale temp file behind.
        if let Ok(tmp_path) = self.tmp_path() {
            let _ = fs::remove_file(tmp_path);
        }

        tracing::info!(path = %self.path.display(), "wallet file erased");
        Ok(())
    }
}
