//! Core shared types for the Payrium key-custody core.
//!
//! This crate defines the types used across the workspace: the wallet
//! [`Address`], epoch-millisecond [`Timestamp`]s, the session
//! [`WalletStatus`], and the unified [`PayriumError`].

pub mod config;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// 20-byte account address derived from a recovery seed.
///
/// Computed as the last 20 bytes of `Keccak-256(uncompressed_pubkey[1..])`
/// of the secp256k1 key at the wallet's derivation path. [`Display`]
/// renders lowercase `0x`-prefixed hex; use
/// `payrium_crypto::checksum::to_checksum_address` for the mixed-case
/// checksummed form.
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Address([u8; 20]);

impl Address {
    /// The fixed byte length of an address.
    pub const LEN: usize = 20;

    /// Creates a new `Address` from raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the lowercase hex digits without the `0x` prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = PayriumError;

    /// Parses `0x` + 40 hex digits, case-insensitively.
    ///
    /// Checksum casing is not verified here.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| PayriumError::InvalidAddress {
                reason: "missing 0x prefix".into(),
            })?;
        let bytes = hex::decode(digits).map_err(|_| PayriumError::InvalidAddress {
            reason: "invalid hex encoding".into(),
        })?;
        if bytes.len() != Self::LEN {
            return Err(PayriumError::InvalidAddress {
                reason: format!("expected {} bytes, got {}", Self::LEN, bytes.len()),
            });
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// UTC instant, persisted as milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` representing the current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a `Timestamp` from epoch milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::PersistenceFailure`] if the value is
    /// outside chrono's representable range.
    pub fn from_millis(millis: i64) -> Result<Self> {
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Self)
            .ok_or_else(|| PayriumError::PersistenceFailure {
                reason: format!("timestamp {millis} out of range"),
            })
    }

    /// Returns milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.as_millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        Self::from_millis(millis).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// WalletStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of the resident wallet as seen by a session.
///
/// There is no persistent `Unlocked` state: a successful unlock hands
/// the decrypted seed to the caller for one operation and the session
/// stays `Locked`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum WalletStatus {
    /// No wallet is stored on this device.
    NoWallet,
    /// A seed was generated or imported and awaits its initial PIN.
    /// Nothing has been persisted yet.
    PendingPin,
    /// An encrypted wallet is stored; the seed is not in memory.
    Locked,
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWallet => write!(f, "no-wallet"),
            Self::PendingPin => write!(f, "pending-pin"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

// ---------------------------------------------------------------------------
// PayriumError
// ---------------------------------------------------------------------------

/// Central error type for the Payrium workspace.
///
/// Wrong PIN, missing wallet and corrupted data are always distinct
/// variants: the recovery action differs for each (retry the PIN,
/// create/import a wallet, restore from the backup phrase).
#[derive(Debug, Error)]
pub enum PayriumError {
    /// The recovery phrase has the wrong word count, an unknown word,
    /// or a bad checksum.
    #[error("invalid mnemonic: {reason}")]
    InvalidMnemonic {
        /// Human-readable description of the validation failure.
        reason: String,
    },

    /// The PIN did not match the stored verification hash.
    #[error("invalid PIN")]
    InvalidPin,

    /// A new PIN does not meet the format requirements.
    #[error("PIN rejected: {reason}")]
    WeakPin {
        /// Which requirement was not met.
        reason: String,
    },

    /// AEAD authentication failed, or the decrypted secret is not the
    /// one the record describes. The stored record is corrupted or out
    /// of sync with its PIN hash.
    #[error("decryption failure: {reason}")]
    DecryptionFailure {
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The operation requires a stored wallet but none exists.
    #[error("no wallet found")]
    NoWalletFound,

    /// The underlying storage could not be read or written.
    #[error("persistence failure: {reason}")]
    PersistenceFailure {
        /// Human-readable description of the storage failure.
        reason: String,
    },

    /// The operation is not valid in the session's current state.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Human-readable description of the state conflict.
        reason: String,
    },

    /// A cryptographic primitive failed (RNG, KDF parameters, key
    /// derivation path).
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable description of the cryptographic failure.
        reason: String,
    },

    /// An address string is malformed or fails its checksum.
    #[error("invalid address: {reason}")]
    InvalidAddress {
        /// Human-readable description of why the address is invalid.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`PayriumError`].
pub type Result<T> = std::result::Result<T, PayriumError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
