//! The base64 prefix a search targets, pre-packed into a `(match, mask)`
//! pair of 64-bit words so the hot loop tests it with one AND and one
//! compare per candidate instead of re-deriving it per iteration.

use crate::base64_codec;
use crate::error::Error;

pub const MAX_PREFIX_CHARS: usize = 10;

/// `match_` and `mask` are built in the same byte layout
/// `FieldElement::to_bytes_u64` produces (first 8 little-endian bytes of
/// the Montgomery u-coordinate reinterpreted as a `u64`), so a candidate
/// test is exactly `u.to_bytes_u64() & mask == match_`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prefix {
    pub match_: u64,
    pub mask: u64,
    pub len_chars: usize,
}

impl Prefix {
    /// Parse a 1-10 character base64 prefix (no `=` padding — a prefix is
    /// not a complete base64-encoded byte string, only its leading bits).
    pub fn parse(s: &str) -> Result<Prefix, Error> {
        let chars = s.as_bytes();
        if chars.is_empty() || chars.len() > MAX_PREFIX_CHARS {
            return Err(Error::PrefixTooLong(chars.len()));
        }

        // Pack the prefix's 6*len bits MSB-first into an 8-byte buffer,
        // the same bit order a base64 encoder reads off the public key's
        // raw byte stream.
        let mut bits: u64 = 0;
        for &c in chars {
            let v = base64_codec::decode_symbol(c).ok_or(Error::InvalidPrefixEncoding)?;
            bits = (bits << 6) | v as u64;
        }
        let total_bits = chars.len() * 6;
        // Left-align the packed bits within the 64-bit word, MSB first,
        // then byte-swap so the layout matches a little-endian byte
        // buffer's first 8 bytes reinterpreted as u64 (`to_bytes_u64`).
        let left_aligned = bits << (64 - total_bits);
        let match_ = left_aligned.swap_bytes();
        let mask = (!0u64 << (64 - total_bits)).swap_bytes();

        Ok(Prefix { match_, mask, len_chars: chars.len() })
    }

    pub fn matches(&self, candidate: u64) -> bool {
        candidate & self.mask == self.match_
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldElement;

    #[test]
    fn single_char_prefix_matches_leading_six_bits() {
        // 'A' decodes to 0, so any u whose top 6 bits (of its byte
        // stream) are zero should match prefix "A".
        let prefix = Prefix::parse("A").unwrap();
        let mut bytes = [0u8; 32];
        bytes[0] = 0b0000_0011; // top 6 bits zero, bottom 2 set
        let u = FieldElement::from_bytes(&bytes).to_bytes_u64();
        assert!(prefix.matches(u));
    }

    #[test]
    fn mismatched_prefix_is_rejected() {
        let prefix = Prefix::parse("A").unwrap();
        let mut bytes = [0u8; 32];
        bytes[0] = 0b1111_1100; // top 6 bits nonzero
        let u = FieldElement::from_bytes(&bytes).to_bytes_u64();
        assert!(!prefix.matches(u));
    }

    #[test]
    fn rejects_too_long_prefix() {
        assert!(matches!(Prefix::parse("01234567890"), Err(Error::PrefixTooLong(11))));
    }

    #[test]
    fn rejects_empty_prefix() {
        assert!(Prefix::parse("").is_err());
    }

    #[test]
    fn rejects_invalid_character() {
        assert!(Prefix::parse("!").is_err());
    }

    #[test]
    fn max_length_prefix_is_accepted() {
        let p = Prefix::parse("0123456789").unwrap();
        assert_eq!(p.len_chars, 10);
    }
}
