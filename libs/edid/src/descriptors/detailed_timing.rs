use serde::Serialize;

use crate::bits::{get_bit_range, has_bit, le16};

/// Size of a detailed timing descriptor, in bytes.
pub const DETAILED_TIMING_SIZE: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StereoMode {
    /// No stereo timing mode
    /// (bit 0 is don't care)
    #[default]
    None,

    FieldSequentialRightStereoSync,
    FieldSequentialLeftStereoSync,
    BiInterleavedRightImageEvenLines,
    BiInterleavedLeftImageEvenLines,
    QuadInterleaved,
    SideBySideInterleaved,
}

impl StereoMode {
    /// Bits 6 and 5 of the features byte are the high part of the stereo
    /// mode, bit 0 is the low part. Bit 0 only matters when the high part
    /// is non-zero.
    fn from_features(features: u8) -> Self {
        let hi = get_bit_range(features, 6, 5);
        let lo = get_bit_range(features, 0, 0);
        if hi == 0 {
            return StereoMode::None;
        }

        match (hi << 1) | lo {
            0b010 => StereoMode::FieldSequentialRightStereoSync,
            0b100 => StereoMode::FieldSequentialLeftStereoSync,
            0b011 => StereoMode::BiInterleavedRightImageEvenLines,
            0b101 => StereoMode::BiInterleavedLeftImageEvenLines,
            0b110 => StereoMode::QuadInterleaved,
            _ => StereoMode::SideBySideInterleaved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncPolarity {
    Negative,
    Positive,
}

impl SyncPolarity {
    fn from_bit(positive: bool) -> Self {
        if positive {
            SyncPolarity::Positive
        } else {
            SyncPolarity::Negative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalogSyncFlags {
    /// Serration
    ///  - `true` = serration pulse required for interlaced sync (H-sync during V-sync)
    ///  - `false` = no serrations
    pub serration: bool,

    /// Sync behavior
    ///  - `true` = sync on all RGB channels
    ///  - `false` = sync on green channel only
    pub sync_on_green: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitalSyncCompositeFlags {
    /// Serration
    /// - `true` = serration pulse required for interlaced sync (H-sync during V-sync)
    /// - `false` = no serrations
    pub serration: bool,

    /// H-sync polarity, outside of V-sync
    pub h_sync_polarity: SyncPolarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitalSyncFlags {
    pub v_sync_polarity: SyncPolarity,
    pub h_sync_polarity: SyncPolarity,
}

/// Signal type of a detailed timing, bits 4 and 3 of the features byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncType {
    AnalogComposite(AnalogSyncFlags),
    BipolarAnalogComposite(AnalogSyncFlags),
    DigitalComposite(DigitalSyncCompositeFlags),
    DigitalSeparate(DigitalSyncFlags),
}

impl SyncType {
    fn from_features(features: u8) -> Self {
        let serration = has_bit(features, 2);
        match get_bit_range(features, 4, 3) {
            0 => SyncType::AnalogComposite(AnalogSyncFlags {
                serration,
                sync_on_green: has_bit(features, 1),
            }),
            1 => SyncType::BipolarAnalogComposite(AnalogSyncFlags {
                serration,
                sync_on_green: has_bit(features, 1),
            }),
            2 => SyncType::DigitalComposite(DigitalSyncCompositeFlags {
                serration,
                h_sync_polarity: SyncPolarity::from_bit(has_bit(features, 1)),
            }),
            _ => SyncType::DigitalSeparate(DigitalSyncFlags {
                v_sync_polarity: SyncPolarity::from_bit(has_bit(features, 2)),
                h_sync_polarity: SyncPolarity::from_bit(has_bit(features, 1)),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSizeMm {
    pub horizontal: i32,
    pub vertical: i32,
}

/// An 18 byte detailed timing descriptor. Found in the base block and in
/// CTA-861 extension blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedTimingDef {
    /// Pixel clock in Hz. The raw value is in 10 kHz units.
    pub pixel_clock_hz: i32,

    /// Horizontal active pixels, 12 bits
    pub horizontal_active_pixels: i32,

    /// Horizontal blanking pixels, end of active pixels to
    /// start of the next line. 12 bits.
    pub horizontal_blanking_pixels: i32,

    /// Vertical active lines per frame, 12 bits
    pub vertical_active_lines: i32,

    /// Vertical blanking lines per frame, end of active lines
    /// to start of the next frame. 12 bits.
    pub vertical_blanking_lines: i32,

    /// Horizontal sync offset (front porch), in pixels. 10 bits.
    pub horizontal_sync_offset: i32,

    /// Horizontal sync pulse width, in pixels. 10 bits.
    pub horizontal_sync_pulse_width: i32,

    /// Vertical sync offset (front porch), in lines. 6 bits.
    pub vertical_sync_offset: i32,

    /// Vertical sync pulse width, in lines. 6 bits.
    pub vertical_sync_pulse_width: i32,

    /// Image size. `None` when unset, or when the bytes hold the 16:9 or 4:3
    /// aspect ratio instead of a size.
    pub image_size_mm: Option<ImageSizeMm>,

    /// Horizontal border, in pixels (one side)
    pub horizontal_border: i32,

    /// Vertical border, in lines (one side)
    pub vertical_border: i32,

    pub interlaced: bool,
    pub stereo_mode: StereoMode,
    pub sync_type: SyncType,
}

impl DetailedTimingDef {
    /// Decodes a detailed timing. The caller has already checked that the
    /// pixel clock bytes are non-zero; every bit pattern is a valid timing
    /// past that point.
    pub fn parse(data: &[u8; DETAILED_TIMING_SIZE]) -> Self {
        // The 4 most significant bits of active and blanking share one byte
        let twelve = |lsb: u8, packed: u8, high: bool| -> i32 {
            let msb = if high {
                get_bit_range(packed, 7, 4)
            } else {
                get_bit_range(packed, 3, 0)
            };
            (i32::from(msb) << 8) | i32::from(lsb)
        };

        let horizontal_image_mm = twelve(data[12], data[14], true);
        let vertical_image_mm = twelve(data[13], data[14], false);
        let image_size_mm = match (horizontal_image_mm, vertical_image_mm) {
            (0, 0) | (16, 9) | (4, 3) => None,
            (horizontal, vertical) => Some(ImageSizeMm {
                horizontal,
                vertical,
            }),
        };

        let features = data[17];

        DetailedTimingDef {
            pixel_clock_hz: i32::from(le16(data[0], data[1])) * 10_000,
            horizontal_active_pixels: twelve(data[2], data[4], true),
            horizontal_blanking_pixels: twelve(data[3], data[4], false),
            vertical_active_lines: twelve(data[5], data[7], true),
            vertical_blanking_lines: twelve(data[6], data[7], false),
            horizontal_sync_offset: (i32::from(get_bit_range(data[11], 7, 6)) << 8)
                | i32::from(data[8]),
            horizontal_sync_pulse_width: (i32::from(get_bit_range(data[11], 5, 4)) << 8)
                | i32::from(data[9]),
            vertical_sync_offset: (i32::from(get_bit_range(data[11], 3, 2)) << 4)
                | i32::from(get_bit_range(data[10], 7, 4)),
            vertical_sync_pulse_width: (i32::from(get_bit_range(data[11], 1, 0)) << 4)
                | i32::from(get_bit_range(data[10], 3, 0)),
            image_size_mm,
            horizontal_border: i32::from(data[15]),
            vertical_border: i32::from(data[16]),
            interlaced: has_bit(features, 7),
            stereo_mode: StereoMode::from_features(features),
            sync_type: SyncType::from_features(features),
        }
    }

    /// Field refresh rate in Hz, as computed from the totals.
    pub fn refresh_rate_hz(&self) -> f64 {
        let horizontal_total = self.horizontal_active_pixels + self.horizontal_blanking_pixels;
        let vertical_total = self.vertical_active_lines + self.vertical_blanking_lines;
        if horizontal_total == 0 || vertical_total == 0 {
            return 0.0;
        }
        f64::from(self.pixel_clock_hz) / (f64::from(horizontal_total) * f64::from(vertical_total))
    }
}
