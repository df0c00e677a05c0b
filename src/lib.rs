//! # inovibe-frame - Decoder for Ino-Vibe LoRa Frames
//!
//! Ino-Vibe accelerometer devices report over LoRa with compact binary
//! frames, delivered to the cloud as hex strings. This crate decodes them.
//!
//! The frame layout is not hard-coded: a declarative field description
//! (bit widths, signedness, nesting, subtype dispatch) is embedded at build
//! time and drives a generic bit-level walker. Typed records are built on
//! top of the walker output.
//!
//! ## Features
//!
//! - Header, alive, wave and notice payload decoding
//! - 16-bit and packed 12-bit wave samples, single axis or interleaved X/Y/Z
//! - Trailing checksum verification
//! - Batch decoding with per-kind failure statistics and throttled warnings
//! - `serde` serialization of every decoded record
//!
//! ## Usage
//!
//! ```rust
//! use inovibe_frame::{decode_frame, FrameParser, Payload};
//!
//! let raw = "0302f411150092100064003bff07ffe3016801044c01000101010c0102060301020223";
//!
//! // Step by step
//! let parser = FrameParser::new(raw).unwrap();
//! let frame = parser.decode_header().unwrap();
//! assert_eq!(frame.header().seq, 244);
//! assert_eq!(frame.alive().unwrap().threshold, 1100);
//!
//! // Or all at once
//! match decode_frame(raw).unwrap().payload {
//!     Payload::Alive(alive) => assert_eq!(alive.alive_period, 360),
//!     _ => unreachable!(),
//! }
//! ```

pub mod batch;
pub mod constants;
pub mod error;
pub mod frame;
pub mod logging;
pub mod spec;
pub mod util;

pub use crate::error::{FrameError, SpecError};
pub use crate::logging::{init_logger, log_info};

pub use batch::{BatchConfig, BatchDecoder, BatchStats};
pub use frame::{
    decode_frame, AlivePayload, DecodedFrame, DeviceType, FrameParser, Header, HeaderedFrame,
    NoticePayload, Payload, PayloadType, Session, WavePayload,
};
pub use spec::{FieldMap, FieldValue, FrameSpec};
