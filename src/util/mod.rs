//! # Utility Modules
//!
//! Hex decoding, bit extraction and logging helpers used by the frame
//! decoder.

pub mod bits;
pub mod hex;
pub mod logging;

pub use bits::{to_signed, BitBuffer};
pub use hex::{decode_nibbles, encode_hex, HexError};
pub use logging::{log_frame_hex, LogThrottle};
