use serde::Serialize;

use crate::{
    bits::{get_bit_range, has_bit, le16},
    descriptors::SyncPolarity,
    logger::FailureLogger,
};

use super::DATA_BLOCK_HEADER_SIZE;

/// Size of one Type I timing descriptor.
pub const TYPE_I_TIMING_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Stereo3d {
    #[default]
    Never,
    Always,
    /// Depends on user action
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimingAspectRatio {
    Ar1_1,
    Ar5_4,
    Ar4_3,
    Ar15_9,
    Ar16_9,
    Ar16_10,
    Ar64_27,
    Ar256_135,
    #[default]
    Undefined,
}

impl TimingAspectRatio {
    /// Horizontal and vertical ratio, `None` if undefined.
    pub fn ratio(self) -> Option<(i32, i32)> {
        match self {
            TimingAspectRatio::Ar1_1 => Some((1, 1)),
            TimingAspectRatio::Ar5_4 => Some((5, 4)),
            TimingAspectRatio::Ar4_3 => Some((4, 3)),
            TimingAspectRatio::Ar15_9 => Some((15, 9)),
            TimingAspectRatio::Ar16_9 => Some((16, 9)),
            TimingAspectRatio::Ar16_10 => Some((16, 10)),
            TimingAspectRatio::Ar64_27 => Some((64, 27)),
            TimingAspectRatio::Ar256_135 => Some((256, 135)),
            TimingAspectRatio::Undefined => None,
        }
    }
}

/// A Type I detailed timing. All counts are stored minus one on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TypeITiming {
    pub pixel_clock_mhz: f64,
    pub preferred: bool,
    pub stereo_3d: Stereo3d,
    pub interlaced: bool,
    pub aspect_ratio: TimingAspectRatio,
    pub horiz_active: i32,
    pub vert_active: i32,
    pub horiz_blank: i32,
    pub vert_blank: i32,
    pub horiz_offset: i32,
    pub vert_offset: i32,
    pub horiz_sync_width: i32,
    pub vert_sync_width: i32,
    pub horiz_sync_polarity: SyncPolarity,
    pub vert_sync_polarity: SyncPolarity,
}

impl TypeITiming {
    fn parse(data: &[u8], logger: &mut FailureLogger) -> Self {
        let raw_pixel_clock = u32::from_le_bytes([data[0], data[1], data[2], 0]);

        let stereo_3d = match get_bit_range(data[3], 6, 5) {
            0 => Stereo3d::Never,
            1 => Stereo3d::Always,
            2 => Stereo3d::User,
            raw => {
                logger.add_failure(format!("Unknown Type I stereo 3D value {}", raw));
                Stereo3d::default()
            }
        };

        let aspect_ratio = match get_bit_range(data[3], 3, 0) {
            0 => TimingAspectRatio::Ar1_1,
            1 => TimingAspectRatio::Ar5_4,
            2 => TimingAspectRatio::Ar4_3,
            3 => TimingAspectRatio::Ar15_9,
            4 => TimingAspectRatio::Ar16_9,
            5 => TimingAspectRatio::Ar16_10,
            6 => TimingAspectRatio::Ar64_27,
            7 => TimingAspectRatio::Ar256_135,
            8 => TimingAspectRatio::Undefined,
            raw => {
                logger.add_failure(format!("Unknown Type I aspect {}", raw));
                TimingAspectRatio::default()
            }
        };

        let field = |lo: usize| 1 + i32::from(le16(data[lo], data[lo + 1]));
        // Sync offsets are 15 bits, bit 7 of the high byte is the polarity
        let offset = |lo: usize| 1 + i32::from(le16(data[lo], get_bit_range(data[lo + 1], 6, 0)));
        let polarity = |byte: u8| {
            if has_bit(byte, 7) {
                SyncPolarity::Positive
            } else {
                SyncPolarity::Negative
            }
        };

        TypeITiming {
            pixel_clock_mhz: f64::from(raw_pixel_clock + 1) * 0.01,
            preferred: has_bit(data[3], 7),
            stereo_3d,
            interlaced: has_bit(data[3], 4),
            aspect_ratio,
            horiz_active: field(4),
            horiz_blank: field(6),
            horiz_offset: offset(8),
            horiz_sync_polarity: polarity(data[9]),
            horiz_sync_width: field(10),
            vert_active: field(12),
            vert_blank: field(14),
            vert_offset: offset(16),
            vert_sync_polarity: polarity(data[17]),
            vert_sync_width: field(18),
        }
    }

    pub fn refresh_rate_hz(&self) -> f64 {
        let total = f64::from(self.horiz_active + self.horiz_blank)
            * f64::from(self.vert_active + self.vert_blank);
        self.pixel_clock_mhz * 1_000_000.0 / total
    }
}

/// Decodes a Type I timing data block. `data` is the whole block, header
/// included. `None` if the payload isn't a whole number of descriptors.
pub(crate) fn parse_type_i_timing_block(
    data: &[u8],
    logger: &mut FailureLogger,
) -> Option<Vec<TypeITiming>> {
    let payload = &data[DATA_BLOCK_HEADER_SIZE..];
    if payload.len() % TYPE_I_TIMING_SIZE != 0 {
        logger.add_failure(format!(
            "Video Timing Modes Type 1 - Detailed Timings Data Block: payload length {} is not a multiple of {}",
            payload.len(),
            TYPE_I_TIMING_SIZE
        ));
        return None;
    }

    Some(
        payload
            .chunks_exact(TYPE_I_TIMING_SIZE)
            .map(|raw| TypeITiming::parse(raw, logger))
            .collect(),
    )
}
