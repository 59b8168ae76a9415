use serde::Serialize;

use crate::{
    bits::{get_bit_range, le16},
    logger::FailureLogger,
    policy::Rule,
};

/// Assembles a 10-bit CIE 1931 coordinate from its high byte and the two
/// low bits stored elsewhere.
pub(crate) fn decode_chromaticity_coord(hi: u8, lo: u8) -> f32 {
    let raw = (u16::from(hi) << 2) | u16::from(lo);
    f32::from(raw) / 1024.0
}

/// Decodes a gamma byte, `0xFF` meaning the gamma is defined elsewhere.
pub(crate) fn decode_gamma(raw: u8) -> Option<f32> {
    if raw == 0xFF {
        None
    } else {
        Some((f32::from(raw) + 100.0) / 100.0)
    }
}

/// An additional white point, from a color point descriptor (tag 0xFB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorPoint {
    pub index: u8,
    pub white_x: f32,
    pub white_y: f32,
    /// `None` if defined elsewhere
    pub gamma: Option<f32>,
}

impl ColorPoint {
    fn parse(data: &[u8]) -> Self {
        ColorPoint {
            index: data[0],
            white_x: decode_chromaticity_coord(data[2], get_bit_range(data[1], 3, 2)),
            white_y: decode_chromaticity_coord(data[3], get_bit_range(data[1], 1, 0)),
            gamma: decode_gamma(data[4]),
        }
    }
}

pub(crate) fn parse_color_points(data: &[u8; 18], logger: &mut FailureLogger) -> Vec<ColorPoint> {
    if data[5] == 0 {
        logger.add_failure("White Point Index Number set to reserved value 0");
    }

    let mut points = vec![ColorPoint::parse(&data[5..10])];
    if data[10] != 0 {
        points.push(ColorPoint::parse(&data[10..15]));
    }
    points
}

/// Display color management (DCM) data (tag 0xF9). Coefficients of the
/// per-channel cubic calibration curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorManagementData {
    pub version: u8,
    pub red_a3: f32,
    pub red_a2: f32,
    pub green_a3: f32,
    pub green_a2: f32,
    pub blue_a3: f32,
    pub blue_a2: f32,
}

impl ColorManagementData {
    pub(crate) fn parse(data: &[u8; 18], revision: u8, logger: &mut FailureLogger) -> Self {
        let coefficient = |offset: usize| f32::from(le16(data[offset], data[offset + 1])) / 100.0;

        let dcm = ColorManagementData {
            version: data[5],
            red_a3: coefficient(6),
            red_a2: coefficient(8),
            green_a3: coefficient(10),
            green_a2: coefficient(12),
            blue_a3: coefficient(14),
            blue_a2: coefficient(16),
        };

        if dcm.version != 3 {
            logger.check(Rule::ColorManagementVersion, revision, || {
                "Color Management Data version must be 3"
            });
        }

        dcm
    }
}
