//! # Frame Error Handling
//!
//! This module defines the error types returned by the frame decoder.
//! `FrameError` covers per-frame failures, `SpecError` covers defects in the
//! declarative frame spec, which only happen when the embedded document is
//! broken or a caller loads a bad alternative spec.

use thiserror::Error;

use crate::frame::PayloadType;
use crate::util::hex::HexError;

/// Represents the different error types that can occur while decoding a frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The raw input is shorter than the fixed header.
    #[error("Invalid raw data: frame too short ({length} hex digits)")]
    ShortFrame { length: usize },

    /// The raw input is not a hex string.
    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] HexError),

    /// The version byte is not supported by this decoder.
    #[error("Frame version not supported: {0}")]
    UnsupportedVersion(u8),

    /// A payload decode was attempted before the header was decoded.
    #[error("Parse header first")]
    HeaderNotDecoded,

    /// A field extends beyond the available bits.
    #[error("Invalid frame: {width} bits at offset {offset} exceed {available} available bits")]
    MalformedFrame {
        offset: usize,
        width: usize,
        available: usize,
    },

    /// A discriminator value has no entry in the dispatch table.
    #[error("Invalid payload type: {field} = {value}")]
    UnknownDiscriminator { field: String, value: u64 },

    /// The requested payload view does not match the header's payload type.
    #[error("Payload type mismatch: expected {expected:?}, header says {actual:?}")]
    PayloadTypeMismatch {
        expected: PayloadType,
        actual: PayloadType,
    },

    /// The trailing checksum byte does not match the frame contents.
    #[error("Invalid checksum: expected 0x{expected:02X}, calculated 0x{calculated:02X}")]
    InvalidChecksum { expected: u8, calculated: u8 },

    /// The frame spec is defective.
    #[error("Frame spec error: {0}")]
    Spec(#[from] SpecError),
}

impl FrameError {
    /// True when the error points at the frame spec rather than the frame data.
    pub fn is_spec_defect(&self) -> bool {
        matches!(self, FrameError::Spec(_))
    }

    /// Short stable name of the error kind, used as a statistics key.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameError::ShortFrame { .. } => "short_frame",
            FrameError::InvalidHex(_) => "invalid_hex",
            FrameError::UnsupportedVersion(_) => "unsupported_version",
            FrameError::HeaderNotDecoded => "header_not_decoded",
            FrameError::MalformedFrame { .. } => "malformed_frame",
            FrameError::UnknownDiscriminator { .. } => "unknown_discriminator",
            FrameError::PayloadTypeMismatch { .. } => "payload_type_mismatch",
            FrameError::InvalidChecksum { .. } => "invalid_checksum",
            FrameError::Spec(_) => "spec",
        }
    }
}

/// Errors raised while loading the frame spec or mapping walker output onto typed records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The spec document is not valid JSON or has the wrong shape.
    #[error("Spec JSON parse failed: {0}")]
    Json(String),

    /// A node is not exactly one of leaf, composite or dispatch.
    #[error("Invalid field node {name:?}: {reason}")]
    InvalidNode { name: String, reason: String },

    /// A dispatch entry names a subtype that is not defined.
    #[error("Unknown subtype {subtype:?} referenced by field {field:?}")]
    UnknownSubtype { field: String, subtype: String },

    /// A dispatch key is not a small integer.
    #[error("Invalid discriminator key {key:?} in field {field:?}")]
    InvalidDiscriminatorKey { field: String, key: String },

    /// A leaf width is zero or wider than 64 bits.
    #[error("Invalid width {bits} for field {field:?}")]
    InvalidWidth { field: String, bits: u32 },

    /// A required top-level spec entry is missing.
    #[error("Missing payload spec: {0}")]
    MissingPayload(String),

    /// Nesting exceeds the allowed depth.
    #[error("Spec nesting deeper than {limit} levels at {field:?}")]
    NestingTooDeep { field: String, limit: usize },

    /// A typed record expects a field the walker did not produce.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A decoded value does not fit the typed record field.
    #[error("Field {field:?} value {value} does not fit its record type")]
    FieldOverflow { field: String, value: i128 },
}
