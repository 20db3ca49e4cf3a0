//! Wallet lifecycle management for Payrium.
//!
//! Handles the full key-custody lifecycle of one device wallet:
//!
//! - **Create** a fresh 12-word recovery phrase, or **import** one
//! - **Encrypt** it under a PIN (PBKDF2-HMAC-SHA256 + ChaCha20-Poly1305)
//! - **Verify** a PIN cheaply, **unlock** or **export** the phrase
//! - **Change** the PIN by re-encrypting in a single atomic write
//! - **Reset** the device back to no wallet
//! - **Back up** the phrase with a show-then-confirm flow
//!
//! Storage is injected through [`payrium_storage::SecureStore`].

pub mod backup;
pub mod blocking;
pub mod seed;
pub mod session;

pub use blocking::AsyncWalletSession;
pub use seed::Seed;
pub use session::WalletSession;
