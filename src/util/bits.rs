//! # Bit Extraction
//!
//! Ino-Vibe frames pack fields at arbitrary bit widths (2-bit wave control
//! flags, 4-bit payload type nibbles, 12-bit accelerometer samples). The
//! `BitBuffer` holds the frame as a dense MSB-first bit sequence and slices
//! any contiguous range out of it with `nom`'s bit-level parsers.
//!
//! ## Usage
//!
//! ```rust
//! use inovibe_frame::util::bits::{to_signed, BitBuffer};
//!
//! let buffer = BitBuffer::from_hex("92f4").unwrap();
//! assert_eq!(buffer.read_unsigned(0, 8).unwrap(), 0x92);
//! assert_eq!(buffer.read_signed(0, 8).unwrap(), -110);
//! assert_eq!(buffer.read_unsigned(8, 4).unwrap(), 0xF);
//!
//! assert_eq!(to_signed(0xFF, 8), -1);
//! ```

use nom::bits::complete::take;
use nom::error::Error as NomError;
use nom::IResult;

use crate::constants::BITS_PER_HEX_DIGIT;
use crate::error::FrameError;
use crate::util::hex::decode_nibbles;

/// Widest field a single read can return
pub const MAX_READ_BITS: usize = 64;

/// Dense bit sequence of a hex-encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuffer {
    /// Builds the buffer from hex digits, four bits per digit.
    pub fn from_hex(hex_str: &str) -> Result<Self, FrameError> {
        let bytes = decode_nibbles(hex_str)?;
        Ok(Self {
            bytes,
            bit_len: hex_str.len() * BITS_PER_HEX_DIGIT,
        })
    }

    /// Builds the buffer from whole bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            bit_len: bytes.len() * 8,
        }
    }

    /// Number of bits available.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Underlying bytes. With an odd digit count the last byte is half padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True when the buffer ends on a byte boundary.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    /// Reads `width` bits starting at `offset` as an unsigned value.
    pub fn read_unsigned(&self, offset: usize, width: usize) -> Result<u64, FrameError> {
        let malformed = FrameError::MalformedFrame {
            offset,
            width,
            available: self.bit_len,
        };

        let end = offset.checked_add(width).ok_or_else(|| malformed.clone())?;
        if width > MAX_READ_BITS || end > self.bit_len {
            return Err(malformed);
        }

        let input = (&self.bytes[offset / 8..], offset % 8);
        let result: IResult<(&[u8], usize), u64, NomError<(&[u8], usize)>> = take(width)(input);
        result.map(|(_, value)| value).map_err(|_| malformed)
    }

    /// Reads `width` bits starting at `offset` as a two's-complement value.
    pub fn read_signed(&self, offset: usize, width: usize) -> Result<i64, FrameError> {
        self.read_unsigned(offset, width)
            .map(|raw| to_signed(raw, width))
    }
}

/// Reinterprets an unsigned `width`-bit value as two's complement.
///
/// For raw value `v`, if `v > 2^(width-1) - 1` the result is `v - 2^width`,
/// otherwise `v` unchanged.
pub fn to_signed(raw: u64, width: usize) -> i64 {
    match width {
        0 => 0,
        w if w >= 64 => raw as i64,
        w => {
            let max_positive = (1u64 << (w - 1)) - 1;
            if raw > max_positive {
                (raw as i128 - (1i128 << w)) as i64
            } else {
                raw as i64
            }
        }
    }
}
