use bitflags::bitflags;
use serde::Serialize;

use crate::{bits::get_bit_range, bits::le16, logger::FailureLogger};

use super::DATA_BLOCK_HEADER_SIZE;

/// Payload size of a Display Parameters data block.
pub const DISPLAY_PARAMS_PAYLOAD_SIZE: usize = 12;

bitflags! {
    /// Feature support flags, byte 0x0B of the block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct DisplayFeatures: u8 {
        const AUDIO = 1 << 7;
        const SEPARATE_AUDIO_INPUTS = 1 << 6;
        const AUDIO_INPUT_OVERRIDE = 1 << 5;
        const POWER_MANAGEMENT = 1 << 4;
        const FIXED_TIMING = 1 << 3;
        const FIXED_PIXEL_FORMAT = 1 << 2;
        /// ACP, ISRC1 or ISRC2 packets
        const AI = 1 << 1;
        const DEINTERLACING = 1 << 0;
    }
}

/// Display Parameters data block (tag 0x01).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayParams {
    pub horiz_image_mm: f32,
    pub vert_image_mm: f32,
    /// Native pixel format
    pub horiz_pixels: i32,
    pub vert_pixels: i32,
    pub features: DisplayFeatures,
    /// `None` if defined elsewhere
    pub gamma: Option<f32>,
    pub aspect_ratio: f32,
    pub bits_per_color_overall: u8,
    pub bits_per_color_native: u8,
}

impl DisplayParams {
    /// `data` is the whole block, header included.
    pub(crate) fn parse(data: &[u8], logger: &mut FailureLogger) -> Option<Self> {
        if data.len() != DATA_BLOCK_HEADER_SIZE + DISPLAY_PARAMS_PAYLOAD_SIZE {
            logger.add_failure(format!(
                "Display Parameters Data Block: DisplayID payload length is different than expected ({} != {})",
                data.len().saturating_sub(DATA_BLOCK_HEADER_SIZE),
                DISPLAY_PARAMS_PAYLOAD_SIZE
            ));
            return None;
        }

        let gamma = match data[0x0C] {
            0xFF => None,
            raw => Some(f32::from(raw) / 100.0 + 1.0),
        };

        Some(DisplayParams {
            // 0.1 mm units
            horiz_image_mm: f32::from(le16(data[0x03], data[0x04])) / 10.0,
            vert_image_mm: f32::from(le16(data[0x05], data[0x06])) / 10.0,
            horiz_pixels: i32::from(le16(data[0x07], data[0x08])),
            vert_pixels: i32::from(le16(data[0x09], data[0x0A])),
            features: DisplayFeatures::from_bits_retain(data[0x0B]),
            gamma,
            aspect_ratio: f32::from(data[0x0D]) / 100.0 + 1.0,
            bits_per_color_overall: get_bit_range(data[0x0E], 7, 4) + 1,
            bits_per_color_native: get_bit_range(data[0x0E], 3, 0) + 1,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PARAMS: [u8; 15] = [
        0x01, 0x00, 0x0C, // header
        0x58, 0x02, // 60.0 mm
        0x52, 0x01, // 33.8 mm
        0x80, 0x07, // 1920
        0x38, 0x04, // 1080
        0x98, // audio, power management, fixed timing
        0x78, // gamma 2.2
        0x4E, // aspect 1.78
        0x77, // 8 bpc
    ];

    #[test]
    fn test_display_params() {
        let mut report = String::new();
        let params = {
            let mut logger = FailureLogger::new(&mut report, "test");
            DisplayParams::parse(&PARAMS, &mut logger)
        }
        .unwrap();

        assert_eq!(params.horiz_image_mm, 60.0);
        assert_eq!(params.vert_image_mm, 33.8);
        assert_eq!(params.horiz_pixels, 1920);
        assert_eq!(params.vert_pixels, 1080);
        assert_eq!(
            params.features,
            DisplayFeatures::AUDIO | DisplayFeatures::POWER_MANAGEMENT | DisplayFeatures::FIXED_TIMING
        );
        assert!((params.gamma.unwrap() - 2.2).abs() < 1e-6);
        assert!((params.aspect_ratio - 1.78).abs() < 1e-6);
        assert_eq!(params.bits_per_color_overall, 8);
        assert_eq!(params.bits_per_color_native, 8);
        assert!(report.is_empty());
    }

    #[test]
    fn test_unset_gamma() {
        let mut data = PARAMS;
        data[0x0C] = 0xFF;

        let mut report = String::new();
        let mut logger = FailureLogger::new(&mut report, "test");
        let params = DisplayParams::parse(&data, &mut logger).unwrap();
        assert_eq!(params.gamma, None);
    }

    #[test]
    fn test_wrong_length() {
        let mut report = String::new();
        let params = {
            let mut logger = FailureLogger::new(&mut report, "test");
            DisplayParams::parse(&PARAMS[..14], &mut logger)
        };
        assert!(params.is_none());
        assert!(report.contains("(11 != 12)"));
    }
}
