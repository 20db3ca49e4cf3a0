//! Recovery-phrase generation, validation and address derivation.
//!
//! A [`Seed`] is a validated, normalized BIP39 phrase. It never
//! implements `Clone`, `Debug` or `Display` with its contents, and its
//! memory is zeroized when dropped.

use std::fmt;

use payrium_crypto::hd_derive;
use payrium_crypto::mnemonic::{generate_mnemonic, is_valid_mnemonic, Mnemonic, WordCount};
use payrium_types::{Address, Result};

/// A validated recovery phrase (12 or 24 words).
pub struct Seed(Mnemonic);

impl Seed {
    /// The normalized phrase: lowercase words separated by single spaces.
    pub fn phrase(&self) -> &str {
        self.0.as_str()
    }

    /// Individual words, in order.
    pub fn words(&self) -> Vec<&str> {
        self.0.words()
    }

    pub fn word_count(&self) -> usize {
        self.0.word_count()
    }

    /// Re-parses the phrase into an independent copy.
    pub(crate) fn duplicate(&self) -> Result<Self> {
        import_from(self.phrase())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed([REDACTED; {} words])", self.word_count())
    }
}

/// Generates a fresh 12-word seed from 128 bits of OS entropy.
pub fn generate() -> Result<Seed> {
    generate_with(WordCount::Twelve)
}

/// Generates a fresh seed of the given length.
pub fn generate_with(count: WordCount) -> Result<Seed> {
    generate_mnemonic(count).map(Seed)
}

/// Returns `true` if `phrase` is a well-formed 12- or 24-word BIP39
/// phrase after normalization. Never errors.
pub fn validate(phrase: &str) -> bool {
    is_valid_mnemonic(phrase)
}

/// Normalizes and validates a user-supplied phrase.
///
/// # Errors
///
/// Returns `PayriumError::InvalidMnemonic` if [`validate`] is false.
pub fn import_from(phrase: &str) -> Result<Seed> {
    Mnemonic::parse(phrase).map(Seed)
}

/// Derives the wallet address of `seed` at `m/44'/60'/0'/0/0`.
///
/// Pure: the same seed always yields the same address.
pub fn derive_address(seed: &Seed) -> Result<Address> {
    hd_derive::derive_address(&seed.0)
}

#[cfg(test)]
mod tests {
    use payrium_types::PayriumError;

    use super::*;

    const TEST_JUNK: &str = "test test test test test test test test test test test junk";

    #[test]
    fn generated_seeds_are_valid_and_distinct() -> std::result::Result<(), PayriumError> {
        let a = generate()?;
        let b = generate()?;
        assert_eq!(a.word_count(), 12);
        assert!(validate(a.phrase()));
        assert_ne!(a.phrase(), b.phrase());

        assert_eq!(generate_with(WordCount::TwentyFour)?.word_count(), 24);
        Ok(())
    }

    #[test]
    fn import_normalizes() -> std::result::Result<(), PayriumError> {
        let seed = import_from("  TEST test  test test test test test test test test test JUNK ")?;
        assert_eq!(seed.phrase(), TEST_JUNK);
        Ok(())
    }

    #[test]
    fn import_rejects_bad_checksum() {
        // "above" keeps the entropy bits of "about" but flips the checksum.
        let bad = "abandon abandon abandon abandon abandon abandon \
                   abandon abandon abandon abandon abandon above";
        assert!(!validate(bad));
        assert!(matches!(
            import_from(bad),
            Err(PayriumError::InvalidMnemonic { .. })
        ));
    }

    #[test]
    fn debug_redacts_phrase() -> std::result::Result<(), PayriumError> {
        let seed = import_from(TEST_JUNK)?;
        let rendered = format!("{seed:?}");
        assert!(!rendered.contains("junk"));
        assert!(rendered.contains("12 words"));
        Ok(())
    }

    #[test]
    fn address_is_stable() -> std::result::Result<(), PayriumError> {
        let seed = import_from(TEST_JUNK)?;
        let copy = seed.duplicate()?;
        assert_eq!(derive_address(&seed)?, derive_address(&copy)?);
        assert_eq!(
            derive_address(&seed)?.to_string(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        Ok(())
    }
}
