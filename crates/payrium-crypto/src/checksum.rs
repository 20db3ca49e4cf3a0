//! EIP-55 mixed-case address checksums and display helpers.
//!
//! A checksummed address uppercases each hex letter whose matching
//! nibble in `Keccak-256(lowercase_hex)` is ≥ 8. All-lowercase and
//! all-uppercase strings carry no checksum and are accepted as-is.
//!
//! Reference: <https://eips.ethereum.org/EIPS/eip-55>

use payrium_types::{Address, PayriumError, Result};

use crate::hash::keccak256;

/// Renders `address` in EIP-55 checksummed form (`0x` + 40 chars).
pub fn to_checksum_address(address: &Address) -> String {
    let lower = address.to_hex();
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses an address string, enforcing the EIP-55 checksum when the
/// hex digits are mixed-case.
///
/// # Errors
///
/// Returns [`PayriumError::InvalidAddress`] for malformed input or a
/// checksum mismatch.
pub fn parse_address(s: &str) -> Result<Address> {
    let address: Address = s.parse()?;

    let digits = &s[2..];
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper && to_checksum_address(&address)[2..] != *digits {
        return Err(PayriumError::InvalidAddress {
            reason: "EIP-55 checksum mismatch".into(),
        });
    }

    Ok(address)
}

/// Returns `true` if `s` is a well-formed address with a valid (or
/// absent) checksum.
pub fn is_valid_address(s: &str) -> bool {
    parse_address(s).is_ok()
}

/// Shortens an address for display: `0x` plus the first `chars` and
/// last `chars` hex digits, joined by `...`.
///
/// Strings too short to shorten are returned unchanged.
pub fn format_address(address: &str, chars: usize) -> String {
    let digits = address.strip_prefix("0x").unwrap_or(address);
    if chars == 0 || digits.len() <= chars * 2 || !digits.is_ascii() {
        return address.to_string();
    }
    format!(
        "0x{}...{}",
        &digits[..chars],
        &digits[digits.len() - chars..]
    )
}
