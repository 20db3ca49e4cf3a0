//! Config file support.
//!
//! The CLI can be configured via flags, a JSON config file, or both
//! (flags override the file).
//!
//! Example `payrium.json`:
//! ```json
//! {
//!   "data_dir": "/home/alice/.payrium",
//!   "wallet": {
//!     "kdf_iterations": 210000,
//!     "default_display_name": "Spending",
//!     "word_count": 24
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use payrium_storage::file::WALLET_FILE_NAME;
use payrium_types::config::WalletConfig;
use payrium_types::{PayriumError, Result};
use serde::{Deserialize, Serialize};

/// JSON config file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfigFile {
    pub data_dir: Option<String>,
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Fully resolved configuration with all defaults applied.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub wallet: WalletConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            wallet: WalletConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PayriumError::ConfigError {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;

        let file: CliConfigFile =
            serde_json::from_str(&text).map_err(|e| PayriumError::ConfigError {
                reason: format!("invalid config JSON: {e}"),
            })?;

        Ok(Self {
            data_dir: file
                .data_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            wallet: file.wallet,
        })
    }

    /// Loads the file at `config_path` if given, otherwise starts from
    /// defaults, then applies `data_dir` on top and validates.
    pub fn resolve(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = base.merge_cli(data_dir);
        config.wallet.validate()?;
        Ok(config)
    }

    /// Merges CLI overrides onto a config-file base.
    pub fn merge_cli(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }

    /// Path of the wallet file inside the data directory.
    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(WALLET_FILE_NAME)
    }
}

/// Platform-specific default data directory.
fn default_data_dir() -> PathBuf {
    if cfg!(target_os = "linux") {
        if let Some(home) = dirs::home_dir() {
            return home.join(".payrium");
        }
    }
    if let Some(data) = dirs::data_dir() {
        return data.join("Payrium");
    }
    PathBuf::from("payrium-data")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::result::Result<PathBuf, PayriumError> {
        let path = std::env::temp_dir().join(format!(
            "payrium_cli_config_{name}_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, contents).map_err(|e| PayriumError::ConfigError {
            reason: e.to_string(),
        })?;
        Ok(path)
    }

    #[test]
    fn file_values_and_defaults() -> std::result::Result<(), PayriumError> {
        let path = write_temp(
            "values",
            r#"{ "data_dir": "/tmp/payrium-x", "wallet": { "word_count": 24 } }"#,
        )?;
        let config = CliConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        let config = config?;

        assert_eq!(config.data_dir, PathBuf::from("/tmp/payrium-x"));
        assert_eq!(config.wallet.word_count, 24);
        assert_eq!(config.wallet.kdf_iterations, 100_000);
        assert_eq!(config.wallet_path(), PathBuf::from("/tmp/payrium-x/wallet.json"));
        Ok(())
    }

    #[test]
    fn cli_data_dir_overrides_file() -> std::result::Result<(), PayriumError> {
        let path = write_temp("override", r#"{ "data_dir": "/tmp/from-file" }"#)?;
        let config = CliConfig::resolve(Some(&path), Some(PathBuf::from("/tmp/from-flag")));
        let _ = std::fs::remove_file(&path);
        assert_eq!(config?.data_dir, PathBuf::from("/tmp/from-flag"));
        Ok(())
    }

    #[test]
    fn invalid_wallet_section_rejected() -> std::result::Result<(), PayriumError> {
        let path = write_temp("invalid", r#"{ "wallet": { "kdf_iterations": 5 } }"#)?;
        let result = CliConfig::resolve(Some(&path), None);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(PayriumError::ConfigError { .. })));
        Ok(())
    }

    #[test]
    fn malformed_json_rejected() -> std::result::Result<(), PayriumError> {
        let path = write_temp("malformed", "{ data_dir: ")?;
        let result = CliConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(PayriumError::ConfigError { .. })));
        Ok(())
    }
}
