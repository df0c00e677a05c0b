use serde::Serialize;

use crate::error::SpecError;
use crate::spec::FieldMap;

wire_enum! {
    /// Accelerometer full-scale range.
    pub enum AccSensitivity {
        G2 = 1,
        G4 = 2,
        G8 = 3,
        G16 = 4,
    }
}

wire_enum! {
    /// Install state of the device.
    pub enum DeviceSetup {
        Uninstalled = 0,
        Installed = 1,
        PrepareInstall = 2,
    }
}

/// Major, minor and revision of a firmware image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub rev: u8,
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.rev)
    }
}

/// Periodic alive report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlivePayload {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    /// Seconds between alive reports
    pub alive_period: u16,
    pub sensitivity: AccSensitivity,
    pub threshold: u16,
    pub acc_int_no: u8,
    pub acc_int_resv: u8,
    pub acc_int_data: u8,
    pub log_enable: u8,
    pub log_interval: u8,
    pub log_blocks: u8,
    pub setup: DeviceSetup,
    pub app_fw: FirmwareVersion,
    pub lora_fw: FirmwareVersion,
}

impl TryFrom<&FieldMap> for AlivePayload {
    type Error = SpecError;

    fn try_from(fields: &FieldMap) -> Result<Self, Self::Error> {
        Ok(Self {
            x: fields.value("x")?,
            y: fields.value("y")?,
            z: fields.value("z")?,
            alive_period: fields.value("alive_period")?,
            sensitivity: AccSensitivity::from(fields.value::<u8>("sensitivity")?),
            threshold: fields.value("threshold")?,
            acc_int_no: fields.value("acc_int_no")?,
            acc_int_resv: fields.value("acc_int_resv")?,
            acc_int_data: fields.value("acc_int_data")?,
            log_enable: fields.value("log_enable")?,
            log_interval: fields.value("log_interval")?,
            log_blocks: fields.value("log_blocks")?,
            setup: DeviceSetup::from(fields.value::<u8>("setup")?),
            app_fw: FirmwareVersion {
                major: fields.value("app_fw_major")?,
                minor: fields.value("app_fw_minor")?,
                rev: fields.value("app_fw_rev")?,
            },
            lora_fw: FirmwareVersion {
                major: fields.value("lora_fw_major")?,
                minor: fields.value("lora_fw_minor")?,
                rev: fields.value("lora_fw_rev")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;

    #[test]
    fn test_alive_fields() {
        let parser =
            FrameParser::new("0302f411150092100064003bff07ffe3016801044c01000101010c0102060301020223")
                .unwrap();
        let alive = parser.decode_header().unwrap().alive().unwrap();

        assert_eq!((alive.x, alive.y, alive.z), (59, -249, -29));
        assert_eq!(alive.alive_period, 360);
        assert_eq!(alive.sensitivity, AccSensitivity::G2);
        assert_eq!(alive.threshold, 1100);
        assert_eq!(alive.acc_int_no, 1);
        assert_eq!(alive.acc_int_resv, 0);
        assert_eq!(alive.acc_int_data, 1);
        assert_eq!(alive.log_enable, 1);
        assert_eq!(alive.log_interval, 1);
        assert_eq!(alive.log_blocks, 12);
        assert_eq!(alive.setup, DeviceSetup::Installed);
        assert_eq!(alive.app_fw.to_string(), "2.6.3");
        assert_eq!(alive.lora_fw.to_string(), "1.2.2");
    }

    #[test]
    fn test_missing_field_reported() {
        let fields = FieldMap::new();
        assert_eq!(
            AlivePayload::try_from(&fields),
            Err(SpecError::MissingField("x".to_string()))
        );
    }
}
