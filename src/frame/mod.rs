//! # Ino-Vibe Frame Decoder
//!
//! Decodes version 3 LoRa frames sent by Ino-Vibe accelerometer devices.
//! A frame is a hex string made of an 80-bit header, a payload whose layout
//! is selected by the header's payload type, and a trailing checksum byte.
//!
//! Decoding is two-phase. [`FrameParser::new`] validates the raw input,
//! [`FrameParser::decode_header`] yields a [`HeaderedFrame`], and only a
//! `HeaderedFrame` offers the payload decoders. Payload decoding without a
//! header is therefore impossible to express.
//!
//! ## Usage
//!
//! ```rust
//! use inovibe_frame::frame::{FrameParser, PayloadType};
//!
//! let parser = FrameParser::new("030316641e009d520bc201040004000c6f").unwrap();
//! let frame = parser.decode_header().unwrap();
//! assert_eq!(frame.header().payload.kind, PayloadType::Notice);
//!
//! let notice = frame.notice().unwrap();
//! println!("{notice:?}");
//! ```

use serde::Serialize;

use crate::constants::{CHECKSUM_BITS, FRAME_VERSION, HEADER_HEX_LEN};
use crate::error::FrameError;
use crate::spec::{walk, FieldMap, FrameSpec};
use crate::util::bits::BitBuffer;
use crate::util::hex::decode_nibbles;
use crate::util::logging::{log_frame_hex, span_checksum, span_frame_decode};

/// Declares a one-byte wire enum that keeps codes it does not name.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A code this decoder has no name for.
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(code: u8) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl $name {
            /// Wire value.
            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Unknown(code) => code,
                }
            }
        }
    };
}

mod alive;
mod header;
mod notice;
mod session;
mod wave;

pub use alive::{AccSensitivity, AlivePayload, DeviceSetup, FirmwareVersion};
pub use header::{DeviceType, Header, PayloadInfo, PayloadType};
pub use notice::{
    ApplicationConfig, ApplicationMode, ConfigRange, MrmtState, NoticePayload, NoticeType,
    PowerUp, RejectCount, SetupChange,
};
pub use session::Session;
pub use wave::{SampleFormat, WaveAxis, WaveControl, WavePackType, WavePayload, WaveRange};

/// Validated raw frame, ready for header decode.
#[derive(Debug, Clone)]
pub struct FrameParser<'s> {
    spec: &'s FrameSpec,
    buffer: BitBuffer,
}

impl FrameParser<'static> {
    /// Validates `raw` against the embedded frame spec.
    ///
    /// Checks run in order: length (`ShortFrame`), version byte
    /// (`UnsupportedVersion`), remaining hex digits (`InvalidHex`).
    pub fn new(raw: &str) -> Result<Self, FrameError> {
        Self::with_spec(raw, FrameSpec::embedded()?)
    }
}

impl<'s> FrameParser<'s> {
    /// Validates `raw` against a caller-supplied frame spec.
    pub fn with_spec(raw: &str, spec: &'s FrameSpec) -> Result<Self, FrameError> {
        let length = raw.chars().count();
        if length < HEADER_HEX_LEN {
            return Err(FrameError::ShortFrame { length });
        }

        // Only the version byte is read before the gate
        if let Some(prefix) = raw.get(..2) {
            if let Some(&version) = decode_nibbles(prefix)?.first() {
                if version != FRAME_VERSION {
                    return Err(FrameError::UnsupportedVersion(version));
                }
            }
        }

        let buffer = BitBuffer::from_hex(raw)?;

        log_frame_hex("Frame", buffer.as_bytes());
        Ok(Self { spec, buffer })
    }

    pub fn spec(&self) -> &'s FrameSpec {
        self.spec
    }

    pub fn buffer(&self) -> &BitBuffer {
        &self.buffer
    }

    /// Header fields as walked, before typing.
    pub fn walk_header(&self) -> Result<FieldMap, FrameError> {
        walk(self.spec.header(), &self.buffer, 0).map(|(fields, _)| fields)
    }

    /// Decodes the header. Calling it again returns an equal result.
    pub fn decode_header(&self) -> Result<HeaderedFrame<'_>, FrameError> {
        let header = Header::try_from(&self.walk_header()?)?;
        log::debug!(
            "Header: seq={} dev_type={:?} payload={:?} battery={} temp={} rssi={}",
            header.seq,
            header.dev_type,
            header.payload.kind,
            header.battery,
            header.temperature,
            header.rssi
        );
        Ok(HeaderedFrame {
            parser: self,
            header,
        })
    }

    /// 8-bit wrapping sum of every byte before the trailing checksum byte.
    pub fn checksum(&self) -> Result<u8, FrameError> {
        let bytes = self.whole_bytes()?;
        Ok(bytes[..bytes.len() - 1]
            .iter()
            .fold(0u8, |sum, byte| sum.wrapping_add(*byte)))
    }

    /// Compares the trailing checksum byte with [`checksum`](Self::checksum).
    pub fn verify_checksum(&self) -> Result<(), FrameError> {
        let calculated = self.checksum()?;
        let bytes = self.whole_bytes()?;
        let expected = bytes[bytes.len() - 1];
        let _span = span_checksum(expected, calculated);

        if expected != calculated {
            return Err(FrameError::InvalidChecksum {
                expected,
                calculated,
            });
        }
        Ok(())
    }

    fn whole_bytes(&self) -> Result<&[u8], FrameError> {
        if !self.buffer.is_byte_aligned() {
            let available = self.buffer.bit_len();
            return Err(FrameError::MalformedFrame {
                offset: available - available % 8,
                width: CHECKSUM_BITS,
                available,
            });
        }
        Ok(self.buffer.as_bytes())
    }
}

/// A frame whose header has been decoded.
#[derive(Debug, Clone)]
pub struct HeaderedFrame<'a> {
    parser: &'a FrameParser<'a>,
    header: Header,
}

impl<'a> HeaderedFrame<'a> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_header(self) -> Header {
        self.header
    }

    /// Payload fields as walked, before typing.
    pub fn payload_fields(&self) -> Result<FieldMap, FrameError> {
        self.walk_payload().map(|(fields, _)| fields)
    }

    /// Decodes an alive report.
    pub fn alive(&self) -> Result<AlivePayload, FrameError> {
        self.expect_type(PayloadType::Alive)?;
        let (fields, _) = self.walk_payload()?;
        Ok(AlivePayload::try_from(&fields)?)
    }

    /// Decodes a wave burst, including its sample array.
    pub fn wave(&self) -> Result<WavePayload, FrameError> {
        self.expect_type(PayloadType::Wave)?;
        let (fields, end) = self.walk_payload()?;
        WavePayload::decode(&fields, &self.parser.buffer, end)
    }

    /// Decodes a notice into its dispatched variant.
    pub fn notice(&self) -> Result<NoticePayload, FrameError> {
        self.expect_type(PayloadType::Notice)?;
        let start = self.parser.spec.header_bits();
        let (fields, end) = self.walk_payload()?;
        NoticePayload::decode(&fields, end - start)
    }

    /// Decodes whichever payload the header announces.
    pub fn payload(&self) -> Result<Payload, FrameError> {
        let kind = self.header.payload.kind;
        let _span = span_frame_decode(kind.spec_key());

        match kind {
            PayloadType::Alive => self.alive().map(Payload::Alive),
            PayloadType::Wave => self.wave().map(Payload::Wave),
            PayloadType::Notice => self.notice().map(Payload::Notice),
            other => Err(unknown_payload_type(other)),
        }
    }

    fn expect_type(&self, expected: PayloadType) -> Result<(), FrameError> {
        let actual = self.header.payload.kind;
        if actual != expected {
            return Err(FrameError::PayloadTypeMismatch { expected, actual });
        }
        Ok(())
    }

    fn walk_payload(&self) -> Result<(FieldMap, usize), FrameError> {
        let kind = self.header.payload.kind;
        let spec = self
            .parser
            .spec
            .payload(kind.spec_key())
            .ok_or_else(|| unknown_payload_type(kind))?;
        walk(spec, &self.parser.buffer, self.parser.spec.header_bits())
    }
}

fn unknown_payload_type(kind: PayloadType) -> FrameError {
    FrameError::UnknownDiscriminator {
        field: "payload.type".to_string(),
        value: u64::from(kind.code()),
    }
}

/// A typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Alive(AlivePayload),
    Wave(WavePayload),
    Notice(NoticePayload),
}

/// Header and payload of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFrame {
    pub header: Header,
    pub payload: Payload,
}

/// Decodes a whole frame with the embedded spec.
pub fn decode_frame(raw: &str) -> Result<DecodedFrame, FrameError> {
    let parser = FrameParser::new(raw)?;
    let frame = parser.decode_header()?;
    let payload = frame.payload()?;
    Ok(DecodedFrame {
        header: frame.into_header(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIVE: &str = "0302f411150092100064003bff07ffe3016801044c01000101010c0102060301020223";

    #[test]
    fn test_construction_order() {
        assert_eq!(
            FrameParser::new("0302f41115").unwrap_err(),
            FrameError::ShortFrame { length: 10 }
        );
        assert!(matches!(
            FrameParser::new("zz02f411150092100064").unwrap_err(),
            FrameError::InvalidHex(_)
        ));
        assert_eq!(
            FrameParser::new("0402f411150092100064").unwrap_err(),
            FrameError::UnsupportedVersion(4)
        );
    }

    #[test]
    fn test_version_checked_before_remaining_digits() {
        assert_eq!(
            FrameParser::new("04zzzzzzzzzzzzzzzzzz").unwrap_err(),
            FrameError::UnsupportedVersion(4)
        );
        assert_eq!(
            FrameParser::new("0402f411150092100064 ").unwrap_err(),
            FrameError::UnsupportedVersion(4)
        );
        // A supported version still needs valid digits after it
        assert!(matches!(
            FrameParser::new("03zzzzzzzzzzzzzzzzzz").unwrap_err(),
            FrameError::InvalidHex(_)
        ));
        // Multi-byte character inside the version byte
        assert!(matches!(
            FrameParser::new("0é02f411150092100064").unwrap_err(),
            FrameError::InvalidHex(_)
        ));
    }

    #[test]
    fn test_header_only_frame() {
        let parser = FrameParser::new("0302f411150092100064").unwrap();
        let frame = parser.decode_header().unwrap();
        assert_eq!(frame.header().seq, 244);
        assert!(matches!(
            frame.alive(),
            Err(FrameError::MalformedFrame { offset: 80, .. })
        ));
    }

    #[test]
    fn test_decode_header_idempotent() {
        let parser = FrameParser::new(ALIVE).unwrap();
        let first = parser.decode_header().unwrap().into_header();
        let second = parser.decode_header().unwrap().into_header();
        assert_eq!(first, second);
    }

    #[test]
    fn test_checksum() {
        let parser = FrameParser::new(ALIVE).unwrap();
        assert_eq!(parser.checksum().unwrap(), 0x23);
        assert!(parser.verify_checksum().is_ok());

        let corrupted = FrameParser::new(&ALIVE.replace("0223", "0224")).unwrap();
        assert_eq!(
            corrupted.verify_checksum(),
            Err(FrameError::InvalidChecksum {
                expected: 0x24,
                calculated: 0x23
            })
        );
    }

    #[test]
    fn test_checksum_needs_whole_bytes() {
        let parser = FrameParser::new("0302f4111500921000640").unwrap();
        assert!(matches!(
            parser.checksum(),
            Err(FrameError::MalformedFrame { width: 8, .. })
        ));
    }

    #[test]
    fn test_payload_type_mismatch() {
        let parser = FrameParser::new(ALIVE).unwrap();
        let frame = parser.decode_header().unwrap();
        assert_eq!(
            frame.notice(),
            Err(FrameError::PayloadTypeMismatch {
                expected: PayloadType::Notice,
                actual: PayloadType::Alive
            })
        );
    }

    #[test]
    fn test_payload_without_layout() {
        // Payload type 2 (event) has no layout
        let parser = FrameParser::new("0302f411150092200064").unwrap();
        let frame = parser.decode_header().unwrap();
        assert_eq!(frame.header().payload.kind, PayloadType::Event);
        assert_eq!(
            frame.payload(),
            Err(FrameError::UnknownDiscriminator {
                field: "payload.type".to_string(),
                value: 2
            })
        );
    }

    #[test]
    fn test_decode_frame() {
        let decoded = decode_frame(ALIVE).unwrap();
        assert_eq!(decoded.header.rssi, -110);
        match decoded.payload {
            Payload::Alive(alive) => assert_eq!(alive.threshold, 1100),
            other => panic!("Expected alive payload, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_enum_keeps_unknown_codes() {
        assert_eq!(PayloadType::from(12), PayloadType::Unknown(12));
        assert_eq!(PayloadType::Unknown(12).code(), 12);
        assert_eq!(PayloadType::from(8).code(), 8);
    }
}
