//! # Hex Decoding Utilities
//!
//! Frames arrive from the network server as hex strings. This module turns
//! them into bytes for the bit extractor and formats bytes back for logs.
//!
//! ## Usage
//!
//! ```rust
//! use inovibe_frame::util::hex::{decode_nibbles, encode_hex};
//!
//! let bytes = decode_nibbles("0302f4").unwrap();
//! assert_eq!(bytes, vec![0x03, 0x02, 0xF4]);
//!
//! // Odd digit counts keep the last nibble in the high half of the final byte
//! assert_eq!(decode_nibbles("abc").unwrap(), vec![0xAB, 0xC0]);
//!
//! assert_eq!(encode_hex(&[0x03, 0x02]), "0302");
//! ```

use thiserror::Error;

/// Errors that can occur during hex operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex character: {0:?}")]
    InvalidCharacter(char),
}

/// Decode a hex string one nibble per digit.
///
/// Whitespace is not accepted: every character must be a hex digit. An odd
/// number of digits is allowed; the final digit fills the high nibble of the
/// last byte and the low nibble is zero.
pub fn decode_nibbles(hex_str: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = Vec::with_capacity(hex_str.len().div_ceil(2));

    for (i, c) in hex_str.chars().enumerate() {
        let nibble = c.to_digit(16).ok_or(HexError::InvalidCharacter(c))? as u8;
        if i % 2 == 0 {
            bytes.push(nibble << 4);
        } else if let Some(last) = bytes.last_mut() {
            *last |= nibble;
        }
    }

    Ok(bytes)
}

/// Format bytes as lowercase hex, the way frames arrive on the wire.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_even() {
        assert_eq!(
            decode_nibbles("0302f41115").unwrap(),
            vec![0x03, 0x02, 0xF4, 0x11, 0x15]
        );
    }

    #[test]
    fn test_decode_mixed_case() {
        assert_eq!(decode_nibbles("ABcd").unwrap(), vec![0xAB, 0xCD]);
    }

    #[test]
    fn test_decode_odd_length() {
        assert_eq!(decode_nibbles("1").unwrap(), vec![0x10]);
        assert_eq!(decode_nibbles("0302f").unwrap(), vec![0x03, 0x02, 0xF0]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode_nibbles("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(decode_nibbles("03g2"), Err(HexError::InvalidCharacter('g')));
        assert_eq!(decode_nibbles("03 02"), Err(HexError::InvalidCharacter(' ')));
        assert_eq!(decode_nibbles("0é"), Err(HexError::InvalidCharacter('é')));
    }

    #[test]
    fn test_encode_matches_wire_format() {
        assert_eq!(encode_hex(&[0x03, 0x02, 0xF4]), "0302f4");
        assert_eq!(encode_hex(&[]), "");
        let raw = "030316641e009d520bc201040004000c6f";
        assert_eq!(encode_hex(&decode_nibbles(raw).unwrap()), raw);
    }
}
