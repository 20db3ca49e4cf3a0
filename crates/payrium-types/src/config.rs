//! Wallet configuration with sensible defaults.
//!
//! Every value has a documented default. Callers load a
//! [`WalletConfig`] from JSON (or build one in code) and must call
//! [`WalletConfig::validate`] before handing it to a session.

use serde::{Deserialize, Serialize};

use crate::{PayriumError, Result};

/// Lowest PBKDF2 iteration count accepted for new encryptions.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Highest PBKDF2 iteration count accepted, for new encryptions and
/// for counts read back from a stored record.
pub const MAX_KDF_ITERATIONS: u32 = 1_000_000;

/// Maximum length of a wallet display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

/// Key-custody configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// PBKDF2-HMAC-SHA256 iteration count used when encrypting a seed.
    ///
    /// Stored alongside each record, so raising it later does not
    /// break decryption of existing wallets.
    pub kdf_iterations: u32,

    /// Display name given to newly created or imported wallets.
    pub default_display_name: String,

    /// Number of words in freshly generated recovery phrases (12 or 24).
    pub word_count: usize,

    /// Minimum number of digits in a PIN.
    pub min_pin_len: usize,

    /// Maximum number of digits in a PIN.
    pub max_pin_len: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: MIN_KDF_ITERATIONS,
            default_display_name: "Main Wallet".into(),
            word_count: 12,
            min_pin_len: 6,
            max_pin_len: 12,
        }
    }
}

impl WalletConfig {
    /// Validates all configuration values.
    ///
    /// Returns an error if any value is outside its acceptable range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&self.kdf_iterations) {
            return Err(PayriumError::ConfigError {
                reason: format!(
                    "kdf_iterations must be between {MIN_KDF_ITERATIONS} and \
                     {MAX_KDF_ITERATIONS}, got {}",
                    self.kdf_iterations
                ),
            });
        }

        normalize_display_name(&self.default_display_name)?;

        if self.word_count != 12 && self.word_count != 24 {
            return Err(PayriumError::ConfigError {
                reason: format!("word_count must be 12 or 24, got {}", self.word_count),
            });
        }

        if self.min_pin_len < 4 {
            return Err(PayriumError::ConfigError {
                reason: "min_pin_len must be at least 4".into(),
            });
        }

        if self.max_pin_len < self.min_pin_len {
            return Err(PayriumError::ConfigError {
                reason: "max_pin_len must not be smaller than min_pin_len".into(),
            });
        }

        Ok(())
    }

    /// Checks a candidate PIN against the configured format: ASCII
    /// digits only, length within `min_pin_len..=max_pin_len`.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::WeakPin`] describing the first violated
    /// requirement.
    pub fn check_pin_format(&self, pin: &str) -> Result<()> {
        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(PayriumError::WeakPin {
                reason: "PIN must contain digits only".into(),
            });
        }
        let len = pin.len();
        if len < self.min_pin_len || len > self.max_pin_len {
            return Err(PayriumError::WeakPin {
                reason: format!(
                    "PIN must be {}-{} digits, got {len}",
                    self.min_pin_len, self.max_pin_len
                ),
            });
        }
        Ok(())
    }
}

/// Trims a wallet display name and checks it is non-empty and at
/// most [`MAX_DISPLAY_NAME_LEN`] characters.
pub fn normalize_display_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PayriumError::ConfigError {
            reason: "display name must not be empty".into(),
        });
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(PayriumError::ConfigError {
            reason: format!("display name exceeds {MAX_DISPLAY_NAME_LEN} characters"),
        });
    }
    Ok(name.to_string())
}
