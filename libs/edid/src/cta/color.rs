use serde::Serialize;

use crate::{
    bits::{get_bit_range, has_bit},
    logger::FailureLogger,
};

/// Colorimetry Data Block (extended tag 5). Each flag is one supported
/// colorimetry standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Colorimetry {
    pub xvycc_601: bool,
    pub xvycc_709: bool,
    pub sycc_601: bool,
    pub opycc_601: bool,
    pub oprgb: bool,
    pub bt2020_cycc: bool,
    pub bt2020_ycc: bool,
    pub bt2020_rgb: bool,
    pub ictcp: bool,
    pub st2113_rgb: bool,
}

impl Colorimetry {
    pub(crate) fn parse(data: &[u8], logger: &mut FailureLogger) -> Option<Self> {
        if data.len() < 2 {
            logger.add_failure(format!(
                "Colorimetry Data Block: Empty Data Block with length {}.",
                data.len()
            ));
            return None;
        }

        let colorimetry = Colorimetry {
            xvycc_601: has_bit(data[0], 0),
            xvycc_709: has_bit(data[0], 1),
            sycc_601: has_bit(data[0], 2),
            opycc_601: has_bit(data[0], 3),
            oprgb: has_bit(data[0], 4),
            bt2020_cycc: has_bit(data[0], 5),
            bt2020_ycc: has_bit(data[0], 6),
            bt2020_rgb: has_bit(data[0], 7),
            ictcp: has_bit(data[1], 7),
            st2113_rgb: has_bit(data[1], 6),
        };

        if get_bit_range(data[1], 5, 4) != 0 {
            logger.add_failure("Colorimetry Data Block: Reserved bits F44-F45 must be 0.");
        }
        // Gamut metadata profiles, reserved since CTA-861-G
        if get_bit_range(data[1], 3, 0) != 0 {
            logger.add_failure("Colorimetry Data Block: Reserved bits MD0-MD3 must be 0.");
        }

        Some(colorimetry)
    }
}

/// Which channel a VESA transfer curve applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferCharacteristicUsage {
    White,
    Red,
    Green,
    Blue,
}

/// Maximum number of points of a VESA transfer curve.
pub const VESA_TRANSFER_MAX_POINTS: usize = 32;

/// VESA Display Transfer Characteristic Data Block (tag 5).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesaTransferCharacteristics {
    pub usage: TransferCharacteristicUsage,
    /// Luminance at evenly spaced input levels, from 0.0 to 1.0. The last
    /// point is always 1.0.
    pub points: Vec<f32>,
}

impl VesaTransferCharacteristics {
    pub(crate) fn parse(data: &[u8], logger: &mut FailureLogger) -> Option<Self> {
        if !matches!(data.len(), 7 | 15 | 31) {
            logger.add_failure(format!(
                "VESA Display Transfer Characteristic Data Block: Invalid length {}.",
                data.len()
            ));
            return None;
        }

        let usage = match get_bit_range(data[0], 7, 6) {
            0 => TransferCharacteristicUsage::White,
            1 => TransferCharacteristicUsage::Red,
            2 => TransferCharacteristicUsage::Green,
            _ => TransferCharacteristicUsage::Blue,
        };

        // Each byte is the increment over the previous point
        let mut points = Vec::with_capacity(data.len() + 1);
        let mut point = f32::from(get_bit_range(data[0], 5, 0)) / 1023.0;
        points.push(point);
        for delta in &data[1..] {
            point += f32::from(*delta) / 1023.0;
            points.push(point);
        }
        points.push(1.0);

        Some(VesaTransferCharacteristics { usage, points })
    }
}
