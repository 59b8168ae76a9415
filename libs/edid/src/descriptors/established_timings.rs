use serde::Serialize;

use crate::{
    bits::{get_bit_range, has_bit},
    dmt::{self, DmtTiming},
    logger::FailureLogger,
    policy::Rule,
};

/// Number of timings an Established Timings III descriptor can list.
pub const ESTABLISHED_TIMINGS_III_COUNT: usize = 44;

/// Legacy timing bitmap at offsets 0x23 to 0x25 of the base block.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, Serialize)]
pub struct EstablishedTimingSupport {
    pub t720x400_70hz: bool,
    pub t720x400_88hz: bool,
    pub t640x480_60hz: bool,
    pub t640x480_67hz: bool,
    pub t640x480_72hz: bool,
    pub t640x480_75hz: bool,
    pub t800x600_56hz: bool,
    pub t800x600_60hz: bool,
    pub t800x600_72hz: bool,
    pub t800x600_75hz: bool,
    pub t832x624_75hz: bool,
    /// Interlaced
    pub t1024x768_87hz: bool,
    pub t1024x768_60hz: bool,
    pub t1024x768_70hz: bool,
    pub t1024x768_75hz: bool,
    pub t1280x1024_75hz: bool,
    pub t1152x870_75hz: bool,
    /// Manufacturer specific timings, bits 6:0 of the third byte
    pub manufacturer_specific: u8,
}

impl EstablishedTimingSupport {
    pub fn parse(bytes: [u8; 3]) -> Self {
        EstablishedTimingSupport {
            t720x400_70hz: has_bit(bytes[0], 7),
            t720x400_88hz: has_bit(bytes[0], 6),
            t640x480_60hz: has_bit(bytes[0], 5),
            t640x480_67hz: has_bit(bytes[0], 4),
            t640x480_72hz: has_bit(bytes[0], 3),
            t640x480_75hz: has_bit(bytes[0], 2),
            t800x600_56hz: has_bit(bytes[0], 1),
            t800x600_60hz: has_bit(bytes[0], 0),

            t800x600_72hz: has_bit(bytes[1], 7),
            t800x600_75hz: has_bit(bytes[1], 6),
            t832x624_75hz: has_bit(bytes[1], 5),
            t1024x768_87hz: has_bit(bytes[1], 4),
            t1024x768_60hz: has_bit(bytes[1], 3),
            t1024x768_70hz: has_bit(bytes[1], 2),
            t1024x768_75hz: has_bit(bytes[1], 1),
            t1280x1024_75hz: has_bit(bytes[1], 0),

            t1152x870_75hz: has_bit(bytes[2], 7),
            manufacturer_specific: get_bit_range(bytes[2], 6, 0),
        }
    }
}

/// DMT ID of each Established Timings III bit, most significant bit of
/// byte 6 first.
const ESTABLISHED_TIMINGS_III: [u8; ESTABLISHED_TIMINGS_III_COUNT] = [
    // Byte 6
    0x01, 0x02, 0x03, 0x07, 0x0E, 0x0C, 0x13, 0x15,
    // Byte 7
    0x16, 0x17, 0x18, 0x19, 0x20, 0x21, 0x23, 0x25,
    // Byte 8
    0x27, 0x2E, 0x2F, 0x30, 0x31, 0x29, 0x2A, 0x2B,
    // Byte 9
    0x2C, 0x39, 0x3A, 0x3B, 0x3C, 0x33, 0x34, 0x35,
    // Byte 10
    0x36, 0x37, 0x3E, 0x3F, 0x41, 0x42, 0x44, 0x45,
    // Byte 11, bits 7:4
    0x46, 0x47, 0x49, 0x4A,
];

/// Decodes an Established Timings III display descriptor (tag 0xF7).
pub(crate) fn parse_established_timings_iii(
    data: &[u8; 18],
    revision: u8,
    logger: &mut FailureLogger,
) -> Vec<&'static DmtTiming> {
    logger.check(Rule::EstablishedTimingsIIIBeforeV14, revision, || {
        "Established timings III: Not allowed for EDID < 1.4."
    });

    let timings = ESTABLISHED_TIMINGS_III
        .iter()
        .enumerate()
        .filter(|(i, _)| has_bit(data[6 + i / 8], 7 - (i % 8) as u8))
        .filter_map(|(_, dmt_id)| dmt::find(*dmt_id))
        .collect();

    let reserved_clear = get_bit_range(data[11], 3, 0) == 0 && data[12..].iter().all(|b| *b == 0);
    if !reserved_clear {
        logger.check(Rule::EstablishedTimingsIIIReservedBits, revision, || {
            "Established timings III: Reserved bits must be set to zero."
        });
    }

    timings
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_established_timings_i_ii() {
        let timings = EstablishedTimingSupport::parse([0b0010_0001, 0b0001_1000, 0b1000_0011]);

        assert!(timings.t640x480_60hz);
        assert!(timings.t800x600_60hz);
        assert!(timings.t1024x768_87hz);
        assert!(timings.t1024x768_60hz);
        assert!(timings.t1152x870_75hz);
        assert!(!timings.t720x400_70hz);
        assert!(!timings.t1280x1024_75hz);
        assert_eq!(timings.manufacturer_specific, 0b11);
    }

    #[test]
    fn test_table_resolves_in_dmt() {
        for dmt_id in ESTABLISHED_TIMINGS_III {
            assert!(dmt::find(dmt_id).is_some(), "DMT {:#04x}", dmt_id);
        }
    }

    #[test]
    fn test_established_timings_iii() {
        let mut data = [0u8; 18];
        data[3] = 0xF7;
        data[5] = 0x0A;
        // 640x350@85 and 1920x1440@75
        data[6] = 0b1000_0000;
        data[11] = 0b0001_0000;

        let mut report = String::new();
        let timings = {
            let mut logger = FailureLogger::new(&mut report, "test");
            parse_established_timings_iii(&data, 4, &mut logger)
        };

        let ids: Vec<u8> = timings.iter().map(|t| t.dmt_id).collect();
        assert_eq!(ids, vec![0x01, 0x4A]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_established_timings_iii_checks() {
        let mut data = [0u8; 18];
        data[3] = 0xF7;
        data[12] = 0x01;

        let mut report = String::new();
        {
            let mut logger = FailureLogger::new(&mut report, "test");
            parse_established_timings_iii(&data, 3, &mut logger);
        }

        assert!(report.contains("Not allowed for EDID < 1.4."));
        assert!(report.contains("Reserved bits must be set to zero."));
    }
}
