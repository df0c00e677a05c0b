//! Ino-Vibe Frame Constants
//!
//! Fixed layout values of the version 3 LoRa frame.

/// The only frame version this decoder understands
pub const FRAME_VERSION: u8 = 3;

/// Header length in hex digits (10 bytes)
pub const HEADER_HEX_LEN: usize = 20;

/// Header length in bits
pub const HEADER_BITS: usize = HEADER_HEX_LEN * BITS_PER_HEX_DIGIT;

/// Bits carried by one hex digit
pub const BITS_PER_HEX_DIGIT: usize = 4;

/// Trailing checksum byte length in bits
pub const CHECKSUM_BITS: usize = 8;

/// Maximum nesting of composite and dispatch fields in a frame spec
pub const MAX_NESTING_DEPTH: usize = 5;

/// Name of the discriminator field used by dispatch fields unless the spec overrides it
pub const DEFAULT_DISCRIMINATOR: &str = "type";

// ----------------------------------------------------------------------------
// Wave sample packing
// ----------------------------------------------------------------------------

/// Sample width for the standard 16-bit packing
pub const WAVE_SAMPLE_BITS_16: usize = 16;

/// Sample width for the compact 12-bit packing
pub const WAVE_SAMPLE_BITS_12: usize = 12;

/// Scale applied to 12-bit samples to restore 16-bit units
pub const WAVE_PACK12_SCALE: i32 = 4;
