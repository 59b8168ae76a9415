use serde::Serialize;

use crate::{
    bits::{get_bit_range, has_bit},
    logger::FailureLogger,
    policy::Rule,
};

use super::CtaFlags;

/// One entry of a Video Data Block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortVideoDescriptor {
    /// Video Identification Code
    pub vic: u8,
    /// The format is a native format of the display
    pub native: bool,
}

impl ShortVideoDescriptor {
    /// Decodes one SVD byte. VICs 1-127 and 193 and up are plain VICs,
    /// 129-192 carry the native bit in bit 7.
    pub(crate) fn parse(raw: u8, revision: u8, logger: &mut FailureLogger) -> Option<Self> {
        match raw {
            0 | 128 | 254.. => {
                logger.check(Rule::ReservedVic, revision, || {
                    format!("Video Data Block: Unknown VIC {}.", raw)
                });
                None
            }
            1..=127 | 193.. => Some(ShortVideoDescriptor {
                vic: raw,
                native: false,
            }),
            _ => Some(ShortVideoDescriptor {
                vic: get_bit_range(raw, 6, 0),
                native: true,
            }),
        }
    }
}

pub(crate) fn parse_video_block(
    data: &[u8],
    revision: u8,
    logger: &mut FailureLogger,
) -> Vec<ShortVideoDescriptor> {
    data.iter()
        .filter_map(|raw| ShortVideoDescriptor::parse(*raw, revision, logger))
        .collect()
}

/// Over- and underscan behavior of a class of video formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverUnderscan {
    /// No data, or for IT and CE formats, not supported
    Unknown,
    AlwaysOverscan,
    AlwaysUnderscan,
    BothOverUnderscan,
}

impl OverUnderscan {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => OverUnderscan::AlwaysOverscan,
            2 => OverUnderscan::AlwaysUnderscan,
            3 => OverUnderscan::BothOverUnderscan,
            _ => OverUnderscan::Unknown,
        }
    }
}

/// Video Capability Data Block (extended tag 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoCapability {
    /// YCC quantization range is selectable via the AVI YQ field
    pub selectable_ycc_quantization_range: bool,
    /// RGB quantization range is selectable via the AVI Q field
    pub selectable_rgb_quantization_range: bool,
    /// Preferred video format
    pub pt_over_underscan: OverUnderscan,
    /// IT video formats
    pub it_over_underscan: OverUnderscan,
    /// CE video formats
    pub ce_over_underscan: OverUnderscan,
}

impl VideoCapability {
    /// `None` if the block is too short to decode, which drops it.
    pub(crate) fn parse(
        data: &[u8],
        revision: u8,
        flags: &CtaFlags,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        let Some(&byte) = data.first() else {
            logger.add_failure(format!(
                "Video Capability Data Block: Empty Data Block with length {}.",
                data.len()
            ));
            return None;
        };

        let video_cap = VideoCapability {
            selectable_ycc_quantization_range: has_bit(byte, 7),
            selectable_rgb_quantization_range: has_bit(byte, 6),
            pt_over_underscan: OverUnderscan::from_bits(get_bit_range(byte, 5, 4)),
            it_over_underscan: OverUnderscan::from_bits(get_bit_range(byte, 3, 2)),
            ce_over_underscan: OverUnderscan::from_bits(get_bit_range(byte, 1, 0)),
        };

        if !video_cap.selectable_rgb_quantization_range {
            logger.check(Rule::RgbQuantizationNotSelectable, revision, || {
                "Video Capability Data Block: Set Selectable RGB Quantization to avoid interop issues."
            });
        }

        // The header underscan flag must agree with the IT scan behavior
        match video_cap.it_over_underscan {
            OverUnderscan::AlwaysOverscan if flags.it_underscan => logger.add_failure(
                "Video Capability Data Block: IT video formats are always overscanned, \
                 but bit 7 of Byte 3 of the CTA-861 Extension header is set to underscanned.",
            ),
            OverUnderscan::AlwaysUnderscan if !flags.it_underscan => logger.add_failure(
                "Video Capability Data Block: IT video formats are always underscanned, \
                 but bit 7 of Byte 3 of the CTA-861 Extension header is set to overscanned.",
            ),
            _ => {}
        }

        Some(video_cap)
    }
}
