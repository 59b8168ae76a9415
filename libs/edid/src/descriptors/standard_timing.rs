use serde::Serialize;

use crate::{
    bits::get_bit_range,
    dmt::{self, DmtTiming},
    logger::FailureLogger,
    policy::Rule,
};

/// Size of a standard timing record, in bytes.
pub const STANDARD_TIMING_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StandardTimingAspectRatio {
    Ar16_10,
    Ar4_3,
    Ar5_4,
    Ar16_9,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandardTiming {
    /// Horizontal addressable pixels, `(byte + 31) * 8`
    pub horizontal_resolution: i32,

    pub aspect_ratio: StandardTimingAspectRatio,

    /// Field refresh rate in Hz, `bits 5:0 + 60`
    pub refresh_rate_hz: i32,
}

impl StandardTiming {
    /// Decodes a 2 byte standard timing. Returns `None` for unused slots.
    pub(crate) fn parse(
        data: [u8; STANDARD_TIMING_SIZE],
        revision: u8,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        if data == [0x01, 0x01] {
            return None;
        }
        if data[0] == 0x00 {
            logger.check(Rule::InvalidStandardTimingCode, revision, || {
                format!(
                    "Use 0x0101 as the invalid Standard Timings code, not 0x{:02x}{:02x}.",
                    data[0], data[1]
                )
            });
            return None;
        }

        let aspect_ratio = match get_bit_range(data[1], 7, 6) {
            0 => StandardTimingAspectRatio::Ar16_10,
            1 => StandardTimingAspectRatio::Ar4_3,
            2 => StandardTimingAspectRatio::Ar5_4,
            _ => StandardTimingAspectRatio::Ar16_9,
        };

        Some(StandardTiming {
            horizontal_resolution: (i32::from(data[0]) + 31) * 8,
            aspect_ratio,
            refresh_rate_hz: i32::from(get_bit_range(data[1], 5, 0)) + 60,
        })
    }

    /// Vertical addressable lines, derived from the aspect ratio.
    pub fn vertical_resolution(&self) -> i32 {
        let h = self.horizontal_resolution;
        match self.aspect_ratio {
            StandardTimingAspectRatio::Ar16_10 => h * 10 / 16,
            StandardTimingAspectRatio::Ar4_3 => h * 3 / 4,
            StandardTimingAspectRatio::Ar5_4 => h * 4 / 5,
            StandardTimingAspectRatio::Ar16_9 => h * 9 / 16,
        }
    }

    /// The DMT timing this standard timing refers to, if any.
    pub fn dmt(&self) -> Option<&'static DmtTiming> {
        dmt::find_standard(
            self.horizontal_resolution,
            self.vertical_resolution(),
            self.refresh_rate_hz,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(data: [u8; 2], revision: u8) -> (Option<StandardTiming>, String) {
        let mut report = String::new();
        let timing = {
            let mut logger = FailureLogger::new(&mut report, "test");
            StandardTiming::parse(data, revision, &mut logger)
        };
        (timing, report)
    }

    #[test]
    fn test_unused_slot() {
        let (timing, report) = parse([0x01, 0x01], 4);
        assert!(timing.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_zero_code_is_flagged() {
        let (timing, report) = parse([0x00, 0x00], 4);
        assert!(timing.is_none());
        assert!(report.contains("Use 0x0101 as the invalid Standard Timings code, not 0x0000."));

        // No longer flagged past 1.4
        let (timing, report) = parse([0x00, 0x00], 5);
        assert!(timing.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_1280x1024_60() {
        let (timing, _) = parse([0x81, 0x80], 4);
        let timing = timing.unwrap();

        assert_eq!(timing.horizontal_resolution, 1280);
        assert_eq!(timing.aspect_ratio, StandardTimingAspectRatio::Ar5_4);
        assert_eq!(timing.vertical_resolution(), 1024);
        assert_eq!(timing.refresh_rate_hz, 60);
        assert_eq!(timing.dmt().map(|t| t.dmt_id), Some(0x23));
    }

    #[test]
    fn test_vertical_resolution_by_aspect() {
        let (timing, _) = parse([0xD1, 0xC0], 4);
        assert_eq!(timing.as_ref().map(|t| t.vertical_resolution()), Some(1080));

        let (timing, _) = parse([0xD1, 0x00], 4);
        assert_eq!(timing.as_ref().map(|t| t.vertical_resolution()), Some(1200));

        let (timing, _) = parse([0x61, 0x40], 4);
        assert_eq!(timing.as_ref().map(|t| t.vertical_resolution()), Some(768));
    }
}
