//! VESA Display Monitor Timing (DMT) lookup table, version 1.0 revision 13.
//!
//! Only the identifying parameters of each timing are kept here. The table is
//! consumed by the standard timing and Established Timings III decoders to
//! resolve codes into well-known modes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DmtTiming {
    /// DMT ID
    pub dmt_id: u8,
    /// EDID standard timing 2-byte code, zero if the mode doesn't have one
    pub edid_std_id: u16,
    /// Addressable pixels
    pub horiz_video: i32,
    /// Addressable lines
    pub vert_video: i32,
    /// Field refresh rate in Hz
    pub refresh_rate_hz: f32,
    pub pixel_clock_hz: i32,
    /// CVT reduced blanking timing
    pub reduced_blanking: bool,
    pub interlaced: bool,
}

const fn dmt(
    dmt_id: u8,
    edid_std_id: u16,
    horiz_video: i32,
    vert_video: i32,
    refresh_rate_hz: f32,
    pixel_clock_khz: i32,
) -> DmtTiming {
    DmtTiming {
        dmt_id,
        edid_std_id,
        horiz_video,
        vert_video,
        refresh_rate_hz,
        pixel_clock_hz: pixel_clock_khz * 1000,
        reduced_blanking: false,
        interlaced: false,
    }
}

const fn rb(timing: DmtTiming) -> DmtTiming {
    DmtTiming {
        reduced_blanking: true,
        ..timing
    }
}

const fn interlaced(timing: DmtTiming) -> DmtTiming {
    DmtTiming {
        interlaced: true,
        ..timing
    }
}

pub static DMT_TIMINGS: [DmtTiming; 88] = [
    dmt(0x01, 0x0000, 640, 350, 85.0, 31_500),
    dmt(0x02, 0x3119, 640, 400, 85.0, 31_500),
    dmt(0x03, 0x0000, 720, 400, 85.0, 35_500),
    dmt(0x04, 0x3140, 640, 480, 60.0, 25_175),
    dmt(0x05, 0x314C, 640, 480, 72.0, 31_500),
    dmt(0x06, 0x314F, 640, 480, 75.0, 31_500),
    dmt(0x07, 0x3159, 640, 480, 85.0, 36_000),
    dmt(0x08, 0x0000, 800, 600, 56.0, 36_000),
    dmt(0x09, 0x4540, 800, 600, 60.0, 40_000),
    dmt(0x0A, 0x454C, 800, 600, 72.0, 50_000),
    dmt(0x0B, 0x454F, 800, 600, 75.0, 49_500),
    dmt(0x0C, 0x4559, 800, 600, 85.0, 56_250),
    rb(dmt(0x0D, 0x0000, 800, 600, 120.0, 73_250)),
    dmt(0x0E, 0x0000, 848, 480, 60.0, 33_750),
    interlaced(dmt(0x0F, 0x0000, 1024, 768, 43.0, 44_900)),
    dmt(0x10, 0x6140, 1024, 768, 60.0, 65_000),
    dmt(0x11, 0x614A, 1024, 768, 70.0, 75_000),
    dmt(0x12, 0x614F, 1024, 768, 75.0, 78_750),
    dmt(0x13, 0x6159, 1024, 768, 85.0, 94_500),
    rb(dmt(0x14, 0x0000, 1024, 768, 120.0, 115_500)),
    dmt(0x15, 0x714F, 1152, 864, 75.0, 108_000),
    rb(dmt(0x16, 0x0000, 1280, 768, 60.0, 68_250)),
    dmt(0x17, 0x0000, 1280, 768, 60.0, 79_500),
    dmt(0x18, 0x0000, 1280, 768, 75.0, 102_250),
    dmt(0x19, 0x0000, 1280, 768, 85.0, 117_500),
    rb(dmt(0x1A, 0x0000, 1280, 768, 120.0, 140_250)),
    rb(dmt(0x1B, 0x0000, 1280, 800, 60.0, 71_000)),
    dmt(0x1C, 0x8100, 1280, 800, 60.0, 83_500),
    dmt(0x1D, 0x810F, 1280, 800, 75.0, 106_500),
    dmt(0x1E, 0x8119, 1280, 800, 85.0, 122_500),
    rb(dmt(0x1F, 0x0000, 1280, 800, 120.0, 146_250)),
    dmt(0x20, 0x8140, 1280, 960, 60.0, 108_000),
    dmt(0x21, 0x8159, 1280, 960, 85.0, 148_500),
    rb(dmt(0x22, 0x0000, 1280, 960, 120.0, 175_500)),
    dmt(0x23, 0x8180, 1280, 1024, 60.0, 108_000),
    dmt(0x24, 0x818F, 1280, 1024, 75.0, 135_000),
    dmt(0x25, 0x8199, 1280, 1024, 85.0, 157_500),
    rb(dmt(0x26, 0x0000, 1280, 1024, 120.0, 187_250)),
    dmt(0x27, 0x0000, 1360, 768, 60.0, 85_500),
    rb(dmt(0x28, 0x0000, 1360, 768, 120.0, 148_250)),
    rb(dmt(0x29, 0x0000, 1400, 1050, 60.0, 101_000)),
    dmt(0x2A, 0x9040, 1400, 1050, 60.0, 121_750),
    dmt(0x2B, 0x904F, 1400, 1050, 75.0, 156_000),
    dmt(0x2C, 0x9059, 1400, 1050, 85.0, 179_500),
    rb(dmt(0x2D, 0x0000, 1400, 1050, 120.0, 208_000)),
    rb(dmt(0x2E, 0x0000, 1440, 900, 60.0, 88_750)),
    dmt(0x2F, 0x9500, 1440, 900, 60.0, 106_500),
    dmt(0x30, 0x950F, 1440, 900, 75.0, 136_750),
    dmt(0x31, 0x9519, 1440, 900, 85.0, 157_000),
    rb(dmt(0x32, 0x0000, 1440, 900, 120.0, 182_750)),
    dmt(0x33, 0xA940, 1600, 1200, 60.0, 162_000),
    dmt(0x34, 0xA945, 1600, 1200, 65.0, 175_500),
    dmt(0x35, 0xA94A, 1600, 1200, 70.0, 189_000),
    dmt(0x36, 0xA94F, 1600, 1200, 75.0, 202_500),
    dmt(0x37, 0xA959, 1600, 1200, 85.0, 229_500),
    rb(dmt(0x38, 0x0000, 1600, 1200, 120.0, 268_250)),
    rb(dmt(0x39, 0x0000, 1680, 1050, 60.0, 119_000)),
    dmt(0x3A, 0xB300, 1680, 1050, 60.0, 146_250),
    dmt(0x3B, 0xB30F, 1680, 1050, 75.0, 187_000),
    dmt(0x3C, 0xB319, 1680, 1050, 85.0, 214_750),
    rb(dmt(0x3D, 0x0000, 1680, 1050, 120.0, 245_500)),
    dmt(0x3E, 0xC140, 1792, 1344, 60.0, 204_750),
    dmt(0x3F, 0xC14F, 1792, 1344, 75.0, 261_000),
    rb(dmt(0x40, 0x0000, 1792, 1344, 120.0, 333_250)),
    dmt(0x41, 0xC940, 1856, 1392, 60.0, 218_250),
    dmt(0x42, 0xC94F, 1856, 1392, 75.0, 288_000),
    rb(dmt(0x43, 0x0000, 1856, 1392, 120.0, 356_500)),
    rb(dmt(0x44, 0x0000, 1920, 1200, 60.0, 154_000)),
    dmt(0x45, 0xD100, 1920, 1200, 60.0, 193_250),
    dmt(0x46, 0xD10F, 1920, 1200, 75.0, 245_250),
    dmt(0x47, 0xD119, 1920, 1200, 85.0, 281_250),
    rb(dmt(0x48, 0x0000, 1920, 1200, 120.0, 317_000)),
    dmt(0x49, 0xD140, 1920, 1440, 60.0, 234_000),
    dmt(0x4A, 0xD14F, 1920, 1440, 75.0, 297_000),
    rb(dmt(0x4B, 0x0000, 1920, 1440, 120.0, 380_500)),
    rb(dmt(0x4C, 0x0000, 2560, 1600, 60.0, 268_500)),
    dmt(0x4D, 0x0000, 2560, 1600, 60.0, 348_500),
    dmt(0x4E, 0x0000, 2560, 1600, 75.0, 443_250),
    dmt(0x4F, 0x0000, 2560, 1600, 85.0, 505_250),
    rb(dmt(0x50, 0x0000, 2560, 1600, 120.0, 552_750)),
    dmt(0x51, 0x0000, 1366, 768, 60.0, 85_500),
    dmt(0x52, 0xD1C0, 1920, 1080, 60.0, 148_500),
    rb(dmt(0x53, 0xA9C0, 1600, 900, 60.0, 108_000)),
    rb(dmt(0x54, 0xE1C0, 2048, 1152, 60.0, 162_000)),
    dmt(0x55, 0x81C0, 1280, 720, 60.0, 74_250),
    rb(dmt(0x56, 0x0000, 1366, 768, 60.0, 72_000)),
    rb(dmt(0x57, 0x0000, 4096, 2160, 60.0, 556_744)),
    rb(dmt(0x58, 0x0000, 4096, 2160, 59.94, 556_188)),
];

/// Looks up a timing by its DMT ID.
pub fn find(dmt_id: u8) -> Option<&'static DmtTiming> {
    DMT_TIMINGS.iter().find(|t| t.dmt_id == dmt_id)
}

/// Looks up the timing an EDID standard timing refers to. Only DMT modes
/// which define a standard timing code can match.
pub fn find_standard(horiz_video: i32, vert_video: i32, refresh_rate_hz: i32) -> Option<&'static DmtTiming> {
    DMT_TIMINGS.iter().find(|t| {
        t.edid_std_id != 0
            && t.horiz_video == horiz_video
            && t.vert_video == vert_video
            && t.refresh_rate_hz == refresh_rate_hz as f32
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ids_are_sorted_and_unique() {
        for pair in DMT_TIMINGS.windows(2) {
            assert!(pair[0].dmt_id < pair[1].dmt_id);
        }
    }

    #[test]
    fn test_standard_codes_match_resolution() {
        // The 2-byte code must decode back into the same mode
        for t in DMT_TIMINGS.iter().filter(|t| t.edid_std_id != 0) {
            let [hi, lo] = t.edid_std_id.to_be_bytes();
            assert_eq!((i32::from(hi) + 31) * 8, t.horiz_video, "DMT {:#04x}", t.dmt_id);
            assert_eq!(
                i32::from(lo & 0x3F) + 60,
                t.refresh_rate_hz as i32,
                "DMT {:#04x}",
                t.dmt_id
            );
        }
    }

    #[test]
    fn test_find() {
        let t = find(0x52).unwrap();
        assert_eq!((t.horiz_video, t.vert_video), (1920, 1080));
        assert_eq!(t.pixel_clock_hz, 148_500_000);
        assert!(find(0x00).is_none());
        assert!(find(0x59).is_none());
    }

    #[test]
    fn test_find_standard() {
        assert_eq!(find_standard(1280, 1024, 60).map(|t| t.dmt_id), Some(0x23));
        // Reduced blanking modes have no standard timing code
        assert_eq!(find_standard(1920, 1200, 60).map(|t| t.dmt_id), Some(0x45));
        assert!(find_standard(1366, 768, 60).is_none());
    }
}
