//! BIP39 mnemonic generation, validation, and seed derivation.
//!
//! Supports the two phrase lengths a wallet offers:
//!
//! | Words | Entropy | Checksum |
//! |-------|---------|----------|
//! | 12    | 128 bit | 4 bit    |
//! | 24    | 256 bit | 8 bit    |
//!
//! 1. **Generation**: entropy → SHA-256 checksum (ENT/32 bits) →
//!    split into 11-bit indices → BIP39 words.
//! 2. **Validation**: normalize, reconstruct entropy from the words,
//!    recompute and verify the checksum.
//! 3. **Seed derivation**: PBKDF2-HMAC-SHA512 with 2048 rounds,
//!    salt = `"mnemonic" + passphrase`, producing a 64-byte seed.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0039.mediawiki>

use hmac::Hmac;
use payrium_types::{PayriumError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::wordlist::{index_to_word, word_to_index};

// ---------------------------------------------------------------------------
// WordCount
// ---------------------------------------------------------------------------

/// Supported mnemonic lengths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WordCount {
    /// 12 words, 128 bits of entropy.
    Twelve,
    /// 24 words, 256 bits of entropy.
    TwentyFour,
}

impl WordCount {
    /// Maps a word count to its variant, or `None` for unsupported
    /// lengths.
    pub fn from_words(words: usize) -> Option<Self> {
        match words {
            12 => Some(Self::Twelve),
            24 => Some(Self::TwentyFour),
            _ => None,
        }
    }

    /// Number of words in the phrase.
    pub fn words(self) -> usize {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
        }
    }

    /// Entropy length in bytes.
    pub fn entropy_len(self) -> usize {
        match self {
            Self::Twelve => 16,
            Self::TwentyFour => 32,
        }
    }

    fn checksum_bits(self) -> usize {
        self.entropy_len() * 8 / 32
    }
}

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// A validated, normalized BIP39 mnemonic phrase.
///
/// Words are lowercase and separated by single spaces. The inner
/// string is zeroized on drop.
pub struct Mnemonic(Zeroizing<String>);

impl Mnemonic {
    /// Normalizes and validates `phrase`.
    ///
    /// # Errors
    ///
    /// Returns [`PayriumError::InvalidMnemonic`] if the phrase fails
    /// any check of [`validate_mnemonic`].
    pub fn parse(phrase: &str) -> Result<Self> {
        let normalized = normalize_phrase(phrase);
        validate_normalized(&normalized)?;
        Ok(Self(normalized))
    }

    /// Returns the mnemonic phrase as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the individual words.
    pub fn words(&self) -> Vec<&str> {
        self.0.split(' ').collect()
    }

    /// Returns the number of words in the mnemonic.
    pub fn word_count(&self) -> usize {
        self.0.split(' ').count()
    }
}

// Mnemonic does not implement Clone/Debug to prevent leakage.

/// Trims, lowercases, and collapses internal whitespace to single
/// spaces.
///
/// The result is built in one buffer sized up front, so no partial
/// copy of the phrase is left behind by a reallocation.
pub fn normalize_phrase(phrase: &str) -> Zeroizing<String> {
    let lowered_len = |word: &str| -> usize {
        word.chars()
            .flat_map(char::to_lowercase)
            .map(char::len_utf8)
            .sum()
    };
    let capacity: usize = phrase
        .split_whitespace()
        .map(|word| lowered_len(word) + 1)
        .sum();

    let mut normalized = Zeroizing::new(String::with_capacity(capacity));
    for word in phrase.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.extend(word.chars().flat_map(char::to_lowercase));
    }
    normalized
}

// ---------------------------------------------------------------------------
// Bip39Seed
// ---------------------------------------------------------------------------

/// A 64-byte seed derived from a BIP39 mnemonic via PBKDF2-HMAC-SHA512.
///
/// Input to BIP32 key derivation. Automatically zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Bip39Seed([u8; 64]);

impl Bip39Seed {
    /// Fixed byte length of a BIP39 seed.
    pub const LEN: usize = 64;

    /// Returns the raw 64-byte seed.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generates a new random mnemonic of the given length.
///
/// Entropy comes straight from the OS CSPRNG on every call and is
/// zeroized once encoded.
pub fn generate_mnemonic(count: WordCount) -> Result<Mnemonic> {
    let mut entropy = vec![0u8; count.entropy_len()];
    let filled = OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|e| PayriumError::CryptoError {
            reason: format!("failed to generate mnemonic entropy: {e}"),
        });

    let result = filled.and_then(|()| entropy_to_mnemonic(&entropy));

    entropy.zeroize();
    result
}

/// Converts raw entropy (16 or 32 bytes) into a BIP39 mnemonic.
///
/// Deterministic core of generation, exposed for test vectors.
///
/// # Errors
///
/// Returns [`PayriumError::CryptoError`] for any other entropy length.
pub fn entropy_to_mnemonic(entropy: &[u8]) -> Result<Mnemonic> {
    let count = match entropy.len() {
        16 => WordCount::Twelve,
        32 => WordCount::TwentyFour,
        other => {
            return Err(PayriumError::CryptoError {
                reason: format!("entropy must be 16 or 32 bytes, got {other}"),
            })
        }
    };

    let checksum = Sha256::digest(entropy);
    let entropy_bits = entropy.len() * 8;
    let total_bits = entropy_bits + count.checksum_bits();

    // Bit i of (entropy || checksum), MSB first.
    let bit_at = |i: usize| -> u16 {
        let byte = if i < entropy_bits {
            entropy[i / 8]
        } else {
            checksum[(i - entropy_bits) / 8]
        };
        u16::from((byte >> (7 - (i % 8))) & 1)
    };

    let mut words = Vec::with_capacity(count.words());
    for chunk_start in (0..total_bits).step_by(11) {
        let idx = (chunk_start..chunk_start + 11).fold(0u16, |acc, i| (acc << 1) | bit_at(i));
        let word = index_to_word(idx).ok_or_else(|| PayriumError::CryptoError {
            reason: format!("BIP39 word index {idx} out of range"),
        })?;
        words.push(word);
    }

    Ok(Mnemonic(Zeroizing::new(words.join(" "))))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates a BIP39 mnemonic phrase.
///
/// # Checks performed
///
/// 1. Normalization (trim, lowercase, collapse whitespace).
/// 2. Exactly 12 or 24 words.
/// 3. Every word exists in the BIP39 English wordlist.
/// 4. Recompute `SHA-256(entropy)` and verify the checksum bits.
///
/// # Errors
///
/// Returns [`PayriumError::InvalidMnemonic`] if any check fails.
pub fn validate_mnemonic(phrase: &str) -> Result<()> {
    let normalized = normalize_phrase(phrase);
    validate_normalized(&normalized)
}

/// Boolean form of [`validate_mnemonic`]; never errors.
pub fn is_valid_mnemonic(phrase: &str) -> bool {
    validate_mnemonic(phrase).is_ok()
}

fn validate_normalized(phrase: &str) -> Result<()> {
    let word_list: Vec<&str> = if phrase.is_empty() {
        Vec::new()
    } else {
        phrase.split(' ').collect()
    };

    let count = WordCount::from_words(word_list.len()).ok_or_else(|| {
        PayriumError::InvalidMnemonic {
            reason: format!("mnemonic must be 12 or 24 words, got {}", word_list.len()),
        }
    })?;

    let mut bits: Vec<u8> = Vec::with_capacity(word_list.len() * 11);
    for (position, word) in word_list.iter().enumerate() {
        let idx = word_to_index(word).ok_or_else(|| PayriumError::InvalidMnemonic {
            reason: format!("word {} is not in the BIP39 wordlist", position + 1),
        })?;
        for j in (0..11).rev() {
            bits.push(((idx >> j) & 1) as u8);
        }
    }

    let entropy_bits = count.entropy_len() * 8;
    let mut entropy = vec![0u8; count.entropy_len()];
    for (i, bit) in bits[..entropy_bits].iter().enumerate() {
        if *bit == 1 {
            entropy[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    let expected = Sha256::digest(&entropy);
    let checksum_ok = bits[entropy_bits..]
        .iter()
        .enumerate()
        .all(|(i, bit)| ((expected[i / 8] >> (7 - (i % 8))) & 1) == *bit);

    entropy.zeroize();
    bits.zeroize();

    if !checksum_ok {
        return Err(PayriumError::InvalidMnemonic {
            reason: "BIP39 mnemonic checksum mismatch".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Derives a 64-byte seed from a mnemonic and optional passphrase.
///
/// PBKDF2-HMAC-SHA512, 2048 rounds, salt = `"mnemonic" + passphrase`.
/// The BIP39 English wordlist is ASCII, so NFKD normalization is a
/// no-op for the phrase.
///
/// # Errors
///
/// Returns [`PayriumError::CryptoError`] if PBKDF2 computation fails.
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Result<Bip39Seed> {
    let mut salt = Vec::with_capacity(8 + passphrase.len());
    salt.extend_from_slice(b"mnemonic");
    salt.extend_from_slice(passphrase.as_bytes());

    let mut output = [0u8; 64];
    let phrase = mnemonic.as_str().as_bytes();
    let result = pbkdf2::pbkdf2::<Hmac<Sha512>>(phrase, &salt, 2048, &mut output).map_err(|e| {
        PayriumError::CryptoError {
            reason: format!("PBKDF2-HMAC-SHA512 failed: {e}"),
        }
    });

    salt.zeroize();
    result?;

    Ok(Bip39Seed(output))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
