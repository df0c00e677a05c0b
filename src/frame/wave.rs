//! Wave bursts: a short control header followed by packed accelerometer
//! samples that run up to the checksum byte.

use serde::Serialize;

use crate::constants::{CHECKSUM_BITS, WAVE_PACK12_SCALE, WAVE_SAMPLE_BITS_12, WAVE_SAMPLE_BITS_16};
use crate::error::{FrameError, SpecError};
use crate::spec::FieldMap;
use crate::util::bits::BitBuffer;

wire_enum! {
    /// Accelerometer range during the burst.
    pub enum WaveRange {
        G2 = 0,
        G4 = 1,
        G8 = 2,
        G16 = 3,
    }
}

wire_enum! {
    /// Axes carried by the sample array.
    pub enum WaveAxis {
        Xyz = 0,
        X = 1,
        Y = 2,
        Z = 3,
    }
}

wire_enum! {
    /// Sample packing of the burst.
    pub enum WavePackType {
        Pack16 = 0,
        Pack12 = 1,
        /// Last frame of a 16-bit burst
        Pack16Finish = 15,
    }
}

/// Width and scale of one packed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    pub bits: usize,
    pub scale: i32,
}

impl WavePackType {
    /// Only `Pack12` narrows the samples; every other code, named or not,
    /// carries 16-bit samples.
    pub fn sample_format(self) -> SampleFormat {
        match self {
            WavePackType::Pack12 => SampleFormat {
                bits: WAVE_SAMPLE_BITS_12,
                scale: WAVE_PACK12_SCALE,
            },
            WavePackType::Pack16 | WavePackType::Pack16Finish | WavePackType::Unknown(_) => {
                SampleFormat {
                    bits: WAVE_SAMPLE_BITS_16,
                    scale: 1,
                }
            }
        }
    }
}

/// Control byte of a wave payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaveControl {
    pub bma_range: WaveRange,
    pub axis: WaveAxis,
    /// Burst identifier shared by all frames of one burst
    pub id: u8,
}

/// Decoded wave burst frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WavePayload {
    pub control: WaveControl,
    pub pack_type: WavePackType,
    /// Position of this frame within the burst
    #[serde(rename = "pos")]
    pub position: u8,
    pub x: Vec<i32>,
    pub y: Vec<i32>,
    pub z: Vec<i32>,
}

impl WavePayload {
    /// Builds the payload from the walked fixed fields and reads the samples
    /// that follow them, starting at bit `samples_start`.
    pub(crate) fn decode(
        fields: &FieldMap,
        buffer: &BitBuffer,
        samples_start: usize,
    ) -> Result<Self, FrameError> {
        let mut wave = Self::try_from(fields)?;

        let format = wave.pack_type.sample_format();

        let samples_end = buffer.bit_len().saturating_sub(CHECKSUM_BITS);
        let available = samples_end.saturating_sub(samples_start);
        let count = available / format.bits;

        let read = |index: usize| -> Result<i32, FrameError> {
            let raw = buffer.read_signed(samples_start + index * format.bits, format.bits)?;
            Ok(raw as i32 * format.scale)
        };

        match wave.control.axis {
            WaveAxis::X => wave.x = (0..count).map(read).collect::<Result<_, _>>()?,
            WaveAxis::Y => wave.y = (0..count).map(read).collect::<Result<_, _>>()?,
            WaveAxis::Z => wave.z = (0..count).map(read).collect::<Result<_, _>>()?,
            WaveAxis::Xyz => {
                let per_axis = count / 3;
                wave.x.reserve(per_axis);
                wave.y.reserve(per_axis);
                wave.z.reserve(per_axis);
                for triple in 0..per_axis {
                    wave.x.push(read(triple * 3)?);
                    wave.y.push(read(triple * 3 + 1)?);
                    wave.z.push(read(triple * 3 + 2)?);
                }
            }
            WaveAxis::Unknown(code) => {
                return Err(FrameError::UnknownDiscriminator {
                    field: "axis".to_string(),
                    value: u64::from(code),
                })
            }
        }

        log::debug!(
            "Wave id={} pos={} pack={:?} axis={:?}: {} samples of {} bits (x={}, y={}, z={})",
            wave.control.id,
            wave.position,
            wave.pack_type,
            wave.control.axis,
            count,
            format.bits,
            wave.x.len(),
            wave.y.len(),
            wave.z.len()
        );

        Ok(wave)
    }

    /// Number of samples across all axes.
    pub fn sample_count(&self) -> usize {
        self.x.len() + self.y.len() + self.z.len()
    }

    /// True for the last frame of a burst.
    pub fn is_final(&self) -> bool {
        self.pack_type == WavePackType::Pack16Finish
    }
}

impl TryFrom<&FieldMap> for WavePayload {
    type Error = SpecError;

    fn try_from(fields: &FieldMap) -> Result<Self, Self::Error> {
        let control = fields.nested("control")?;
        Ok(Self {
            control: WaveControl {
                bma_range: WaveRange::from(control.value::<u8>("bma_range")?),
                axis: WaveAxis::from(control.value::<u8>("axis")?),
                id: control.value("id")?,
            },
            pack_type: WavePackType::from(fields.value::<u8>("pack_type")?),
            position: fields.value("pos")?,
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
        })
    }
}
