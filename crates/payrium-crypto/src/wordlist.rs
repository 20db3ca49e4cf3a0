//! BIP39 English wordlist lookups.
//!
//! The 2048 words come from the `bip39` crate; this module adds the
//! index/word lookups the mnemonic encoder needs. The English list is
//! sorted, so reverse lookup is a binary search.

use bip39::Language;

/// Number of words in a BIP39 wordlist.
pub const WORDLIST_LEN: usize = 2048;

/// Returns the BIP39 English wordlist, in canonical (sorted) order.
pub fn wordlist() -> &'static [&'static str; WORDLIST_LEN] {
    Language::English.word_list()
}

/// Returns the word at `index`, or `None` if `index >= 2048`.
pub fn index_to_word(index: u16) -> Option<&'static str> {
    wordlist().get(usize::from(index)).copied()
}

/// Returns the 11-bit index of `word`, or `None` if it is not in the
/// list. Expects an already-lowercased word.
pub fn word_to_index(word: &str) -> Option<u16> {
    wordlist()
        .binary_search_by(|candidate| (*candidate).cmp(word))
        .ok()
        .and_then(|idx| u16::try_from(idx).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_boundaries() {
        assert_eq!(index_to_word(0), Some("abandon"));
        assert_eq!(index_to_word(2047), Some("zoo"));
        assert_eq!(index_to_word(2048), None);
    }

    #[test]
    fn reverse_lookup() {
        assert_eq!(word_to_index("abandon"), Some(0));
        assert_eq!(word_to_index("about"), Some(3));
        assert_eq!(word_to_index("zoo"), Some(2047));
        assert_eq!(word_to_index("notaword"), None);
        assert_eq!(word_to_index("Abandon"), None);
    }

    #[test]
    fn list_is_sorted() {
        assert!(wordlist().windows(2).all(|w| w[0] < w[1]));
    }
}
