use serde::Serialize;

use crate::error::SpecError;
use crate::spec::FieldMap;

wire_enum! {
    /// Ino-Vibe hardware type.
    pub enum DeviceType {
        InoVibe = 2,
        InoVibeS = 3,
    }
}

wire_enum! {
    /// Payload kinds announced by the header's payload `type` nibble.
    pub enum PayloadType {
        Undefined = 0,
        Alive = 1,
        Event = 2,
        Error = 3,
        Ack = 4,
        Notice = 5,
        DataLog = 6,
        Report = 7,
        Wave = 8,
        Inclination = 9,
        MrMeasure = 10,
        MrReport = 11,
    }
}

impl PayloadType {
    /// Top-level key of this payload's layout in the frame spec.
    pub fn spec_key(self) -> &'static str {
        match self {
            PayloadType::Undefined => "undefined",
            PayloadType::Alive => "alive",
            PayloadType::Event => "event",
            PayloadType::Error => "error",
            PayloadType::Ack => "ack",
            PayloadType::Notice => "notice",
            PayloadType::DataLog => "datalog",
            PayloadType::Report => "report",
            PayloadType::Wave => "wave",
            PayloadType::Inclination => "inclination",
            PayloadType::MrMeasure => "mr_measure",
            PayloadType::MrReport => "mr_report",
            PayloadType::Unknown(_) => "reserved",
        }
    }
}

/// Payload descriptor byte of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadInfo {
    #[serde(rename = "type")]
    pub kind: PayloadType,
    pub request: u8,
}

/// The fixed 80-bit frame header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: u8,
    pub dev_type: DeviceType,
    pub seq: u8,
    pub battery: u8,
    /// Degrees Celsius
    pub temperature: i8,
    pub lora_err: u8,
    /// dBm
    pub rssi: i8,
    pub payload: PayloadInfo,
    pub resv: u16,
}

impl TryFrom<&FieldMap> for Header {
    type Error = SpecError;

    fn try_from(fields: &FieldMap) -> Result<Self, Self::Error> {
        let payload = fields.nested("payload")?;
        Ok(Self {
            version: fields.value("version")?,
            dev_type: DeviceType::from(fields.value::<u8>("dev_type")?),
            seq: fields.value("seq")?,
            battery: fields.value("battery")?,
            temperature: fields.value("temperature")?,
            lora_err: fields.value("lora_err")?,
            rssi: fields.value("rssi")?,
            payload: PayloadInfo {
                kind: PayloadType::from(payload.value::<u8>("type")?),
                request: payload.value("request")?,
            },
            resv: fields.value("resv")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;

    #[test]
    fn test_header_fields() {
        let parser = FrameParser::new("0302f411150092100064").unwrap();
        let header = parser.decode_header().unwrap().into_header();

        assert_eq!(header.version, 3);
        assert_eq!(header.dev_type, DeviceType::InoVibe);
        assert_eq!(header.seq, 244);
        assert_eq!(header.battery, 17);
        assert_eq!(header.temperature, 21);
        assert_eq!(header.lora_err, 0);
        assert_eq!(header.rssi, -110);
        assert_eq!(header.payload.kind, PayloadType::Alive);
        assert_eq!(header.payload.request, 0);
        assert_eq!(header.resv, 100);
    }

    #[test]
    fn test_negative_temperature() {
        // temperature byte 0xF6 = -10
        let parser = FrameParser::new("030301f6f60092100000").unwrap();
        let header = parser.decode_header().unwrap().into_header();
        assert_eq!(header.dev_type, DeviceType::InoVibeS);
        assert_eq!(header.battery, 0xF6);
        assert_eq!(header.temperature, -10);
    }

    #[test]
    fn test_payload_keys() {
        assert_eq!(PayloadType::Alive.spec_key(), "alive");
        assert_eq!(PayloadType::Wave.spec_key(), "wave");
        assert_eq!(PayloadType::Notice.spec_key(), "notice");
        assert_eq!(PayloadType::from(15).spec_key(), "reserved");
    }

    #[test]
    fn test_header_serialization() {
        let parser = FrameParser::new("0302f411150092100064").unwrap();
        let header = parser.decode_header().unwrap().into_header();
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["payload"]["type"], "Alive");
        assert_eq!(json["rssi"], -110);
        assert_eq!(json["dev_type"], "InoVibe");
    }
}
