//! Content fingerprint
//!
//! 32-bit rolling multiply-and-add hash over UTF-16 code units
//! (`h = h * 31 + unit`, wrapping). Used to verify that a delta is applied
//! to the text it was computed against. Not cryptographic: collisions are
//! possible, so a match is never proof of equality.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fingerprint of a text state. Displays as 8 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentHash(pub u32);

impl ContentHash {
    /// Hex rendering, as shown in error messages and debug views.
    pub fn to_hex(self) -> String {
        format!("{:08x}", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Hash `content`.
#[inline]
pub fn hash_content(content: &str) -> ContentHash {
    let mut h: u32 = 0;
    for unit in content.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    ContentHash(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_hashes_to_zero() {
        assert_eq!(hash_content(""), ContentHash(0));
    }

    #[test]
    fn single_char_is_its_code_unit() {
        assert_eq!(hash_content("A"), ContentHash(65));
    }

    #[test]
    fn two_chars_roll() {
        // 'A' * 31 + 'B'
        assert_eq!(hash_content("AB"), ContentHash(65 * 31 + 66));
    }

    #[test]
    fn deterministic() {
        let s = "== knot_one ==\nHello, world.\n-> END";
        assert_eq!(hash_content(s), hash_content(s));
    }

    #[test]
    fn order_matters() {
        assert_ne!(hash_content("ab"), hash_content("ba"));
    }

    #[test]
    fn astral_chars_hash_as_surrogate_pairs() {
        // U+1F600 is D83D DE00 in UTF-16
        let expected = 0xD83Du32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(hash_content("\u{1F600}"), ContentHash(expected));
    }

    #[test]
    fn long_input_wraps_without_panicking() {
        let s = "z".repeat(10_000);
        let _ = hash_content(&s);
    }

    #[test]
    fn hex_rendering_is_zero_padded() {
        assert_eq!(ContentHash(0xab).to_hex(), "000000ab");
        assert_eq!(ContentHash(0xdead_beef).to_string(), "deadbeef");
    }
}
