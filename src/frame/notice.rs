//! Notice payloads: a `type` and `length` prefix followed by one of several
//! layouts selected by `type`. The frame spec performs the dispatch; this
//! module maps the merged fields onto the matching typed record.

use serde::Serialize;

use super::alive::DeviceSetup;
use crate::error::{FrameError, SpecError};
use crate::spec::FieldMap;

/// Bits taken by the `type` and `length` prefix
const NOTICE_PREFIX_BITS: usize = 16;

wire_enum! {
    /// Notice subtypes.
    pub enum NoticeType {
        PowerUp = 1,
        PowerOff = 2,
        Setup = 4,
        TestResult = 5,
        RejectCount = 6,
        ApplicationConfig = 7,
    }
}

wire_enum! {
    /// Detection mode of the device application.
    pub enum ApplicationMode {
        ExaInc = 0,
        Mrmt = 1,
        Impact = 2,
    }
}

wire_enum! {
    /// Configured accelerometer range.
    pub enum ConfigRange {
        G2 = 1,
        G4 = 2,
        G8 = 3,
        G16 = 4,
    }
}

wire_enum! {
    /// Runtime state of the MRMT application.
    pub enum MrmtState {
        Commission = 0,
        Inactive = 1,
        Active = 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerUp {
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub length: u8,
    pub reset_reason: u8,
    pub turnon_count: u8,
    pub off_reason: u8,
}

/// Install state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupChange {
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub length: u8,
    pub current_state: DeviceSetup,
    pub previous_state: DeviceSetup,
}

/// Rejected event counter over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectCount {
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub length: u8,
    pub count: u16,
    pub period: u8,
    pub threshold: u8,
}

/// Application configuration reported by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationConfig {
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub length: u8,
    pub app_mode: ApplicationMode,
    pub bma_g_range: ConfigRange,
    pub bma_high_g_threshold_mg: u16,
    pub no_sub_interval: u8,
    pub nrf_reject_threshold_mg: u8,
    pub nrf_impact_threshold_mg: u16,
    pub inclination_check_period: u8,
    pub tx_skip_no: u8,
    pub base_x: u16,
    pub base_y: u16,
    pub base_z: u16,
    pub mrmt_state: MrmtState,
    pub mrmt_operation_threshold_mg: u16,
    pub mrmt_shock_threshold_mg: u16,
}

/// A decoded notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum NoticePayload {
    PowerUp(PowerUp),
    Setup(SetupChange),
    RejectCount(RejectCount),
    ApplicationConfig(ApplicationConfig),
}

impl NoticePayload {
    /// Types the walked notice fields. `consumed_bits` is the width of the
    /// whole notice as walked, prefix included.
    pub(crate) fn decode(fields: &FieldMap, consumed_bits: usize) -> Result<Self, FrameError> {
        let notice_type = NoticeType::from(fields.value::<u8>("type")?);
        let length: u8 = fields.value("length")?;

        let body_bits = consumed_bits.saturating_sub(NOTICE_PREFIX_BITS);
        if usize::from(length) * 8 != body_bits {
            log::warn!(
                "Notice {notice_type:?} declares {length} bytes but its layout has {body_bits} bits"
            );
        }

        let notice = match notice_type {
            NoticeType::PowerUp => NoticePayload::PowerUp(PowerUp {
                notice_type,
                length,
                reset_reason: fields.value("reset_reason")?,
                turnon_count: fields.value("turnon_count")?,
                off_reason: fields.value("off_reason")?,
            }),
            NoticeType::Setup => NoticePayload::Setup(SetupChange {
                notice_type,
                length,
                current_state: DeviceSetup::from(fields.value::<u8>("current_state")?),
                previous_state: DeviceSetup::from(fields.value::<u8>("previous_state")?),
            }),
            NoticeType::RejectCount => NoticePayload::RejectCount(RejectCount {
                notice_type,
                length,
                count: fields.value("count")?,
                period: fields.value("period")?,
                threshold: fields.value("threshold")?,
            }),
            NoticeType::ApplicationConfig => {
                NoticePayload::ApplicationConfig(application_config(fields, length)?)
            }
            other => {
                return Err(FrameError::UnknownDiscriminator {
                    field: "type".to_string(),
                    value: u64::from(other.code()),
                })
            }
        };

        log::debug!("Notice {notice_type:?} ({length} bytes)");
        Ok(notice)
    }

    pub fn notice_type(&self) -> NoticeType {
        match self {
            NoticePayload::PowerUp(n) => n.notice_type,
            NoticePayload::Setup(n) => n.notice_type,
            NoticePayload::RejectCount(n) => n.notice_type,
            NoticePayload::ApplicationConfig(n) => n.notice_type,
        }
    }
}

fn application_config(fields: &FieldMap, length: u8) -> Result<ApplicationConfig, SpecError> {
    Ok(ApplicationConfig {
        notice_type: NoticeType::ApplicationConfig,
        length,
        app_mode: ApplicationMode::from(fields.value::<u8>("app_mode")?),
        bma_g_range: ConfigRange::from(fields.value::<u8>("bma_g_range")?),
        bma_high_g_threshold_mg: fields.value("bma_high_g_threshold_mg")?,
        no_sub_interval: fields.value("no_sub_interval")?,
        nrf_reject_threshold_mg: fields.value("nrf_reject_threshold_mg")?,
        nrf_impact_threshold_mg: fields.value("nrf_impact_threshold_mg")?,
        inclination_check_period: fields.value("inclination_check_period")?,
        tx_skip_no: fields.value("tx_skip_no")?,
        base_x: fields.value("base_x")?,
        base_y: fields.value("base_y")?,
        base_z: fields.value("base_z")?,
        mrmt_state: MrmtState::from(fields.value::<u8>("mrmt_state")?),
        mrmt_operation_threshold_mg: fields.value("mrmt_operation_threshold_mg")?,
        mrmt_shock_threshold_mg: fields.value("mrmt_shock_threshold_mg")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameParser;

    fn decode(raw: &str) -> Result<NoticePayload, FrameError> {
        FrameParser::new(raw)?.decode_header()?.notice()
    }

    #[test]
    fn test_power_up() {
        assert_eq!(
            decode("030316641e009d520bc201040004000c6f").unwrap(),
            NoticePayload::PowerUp(PowerUp {
                notice_type: NoticeType::PowerUp,
                length: 4,
                reset_reason: 0,
                turnon_count: 4,
                off_reason: 12,
            })
        );
    }

    #[test]
    fn test_setup() {
        let notice = decode("03031b641e009b500bb20402010254").unwrap();
        assert_eq!(notice.notice_type(), NoticeType::Setup);
        assert_eq!(
            notice,
            NoticePayload::Setup(SetupChange {
                notice_type: NoticeType::Setup,
                length: 2,
                current_state: DeviceSetup::Installed,
                previous_state: DeviceSetup::PrepareInstall,
            })
        );
    }

    #[test]
    fn test_prefix_only_fields_missing() {
        let mut fields = FieldMap::new();
        fields.insert("type", crate::spec::FieldValue::Unsigned(6));
        fields.insert("length", crate::spec::FieldValue::Unsigned(4));
        assert_eq!(
            NoticePayload::decode(&fields, 48),
            Err(FrameError::Spec(SpecError::MissingField("count".to_string())))
        );
    }

    #[test]
    fn test_power_off_has_no_layout() {
        let mut fields = FieldMap::new();
        fields.insert("type", crate::spec::FieldValue::Unsigned(2));
        fields.insert("length", crate::spec::FieldValue::Unsigned(0));
        assert_eq!(
            NoticePayload::decode(&fields, 16),
            Err(FrameError::UnknownDiscriminator {
                field: "type".to_string(),
                value: 2
            })
        );
    }

    #[test]
    fn test_serialized_tag() {
        let notice = decode("030316641e009d520bc201040004000c6f").unwrap();
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["notice"], "power_up");
        assert_eq!(json["type"], "PowerUp");
        assert_eq!(json["turnon_count"], 4);
    }
}
