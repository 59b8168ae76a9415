use serde::Serialize;

use crate::{logger::FailureLogger, policy::Rule};

use super::{
    CtaFlags, Colorimetry, HdrStaticMetadata, ShortVideoDescriptor, VesaTransferCharacteristics,
    VideoCapability, video::parse_video_block,
};

/// A CTA-861 data block. Blocks without a structured decoder are kept as
/// bare variants so their presence is still visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CtaDataBlock {
    Audio,
    Video(Vec<ShortVideoDescriptor>),
    SpeakerAllocation,
    VesaTransferCharacteristics(VesaTransferCharacteristics),

    // Extended tags
    VideoCapability(VideoCapability),
    VesaDisplayDevice,
    Colorimetry(Colorimetry),
    HdrStaticMetadata(HdrStaticMetadata),
    HdrDynamicMetadata,
    VideoFormatPreference,
    YCbCr420,
    YCbCr420CapabilityMap,
    HdmiAudio,
    RoomConfiguration,
    SpeakerLocation,
    InfoFrame,
    DisplayIdVideoTimingVII,
    DisplayIdVideoTimingVIII,
    DisplayIdVideoTimingX,
    HdmiEdidExtensionOverride,
    HdmiSinkCapability,
}

impl CtaDataBlock {
    pub fn name(&self) -> &'static str {
        match self {
            CtaDataBlock::Audio => "Audio Data Block",
            CtaDataBlock::Video(_) => "Video Data Block",
            CtaDataBlock::SpeakerAllocation => "Speaker Allocation Data Block",
            CtaDataBlock::VesaTransferCharacteristics(_) => {
                "VESA Display Transfer Characteristics Data Block"
            }
            CtaDataBlock::VideoCapability(_) => "Video Capability Data Block",
            CtaDataBlock::VesaDisplayDevice => "VESA Video Display Device Data Block",
            CtaDataBlock::Colorimetry(_) => "Colorimetry Data Block",
            CtaDataBlock::HdrStaticMetadata(_) => "HDR Static Metadata Data Block",
            CtaDataBlock::HdrDynamicMetadata => "HDR Dynamic Metadata Data Block",
            CtaDataBlock::VideoFormatPreference => "Video Format Preference Data Block",
            CtaDataBlock::YCbCr420 => "YCbCr 4:2:0 Video Data Block",
            CtaDataBlock::YCbCr420CapabilityMap => "YCbCr 4:2:0 Capability Map Data Block",
            CtaDataBlock::HdmiAudio => "HDMI Audio Data Block",
            CtaDataBlock::RoomConfiguration => "Room Configuration Data Block",
            CtaDataBlock::SpeakerLocation => "Speaker Location Data Block",
            CtaDataBlock::InfoFrame => "InfoFrame Data Block",
            CtaDataBlock::DisplayIdVideoTimingVII => "DisplayID Type VII Video Timing Data Block",
            CtaDataBlock::DisplayIdVideoTimingVIII => {
                "DisplayID Type VIII Video Timing Data Block"
            }
            CtaDataBlock::DisplayIdVideoTimingX => "DisplayID Type X Video Timing Data Block",
            CtaDataBlock::HdmiEdidExtensionOverride => {
                "HDMI Forum EDID Extension Override Data Block"
            }
            CtaDataBlock::HdmiSinkCapability => "HDMI Forum Sink Capability Data Block",
        }
    }

    /// Decodes the payload of a data block with the given 3-bit tag.
    ///
    /// Returns `None` when the block is dropped: vendor-specific blocks,
    /// reserved tags, and blocks whose payload failed validation. None of
    /// these abort decoding of the extension.
    pub(crate) fn parse(
        tag: u8,
        data: &[u8],
        revision: u8,
        flags: &CtaFlags,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        let block = match tag {
            1 => CtaDataBlock::Audio,
            2 => CtaDataBlock::Video(parse_video_block(data, revision, logger)),
            3 => {
                log::trace!("Skipping vendor-specific data block");
                return None;
            }
            4 => CtaDataBlock::SpeakerAllocation,
            5 => CtaDataBlock::VesaTransferCharacteristics(VesaTransferCharacteristics::parse(
                data, logger,
            )?),
            7 => return Self::parse_extended(data, revision, flags, logger),
            _ => {
                logger.check(Rule::UnknownCtaDataBlock, revision, || {
                    format!(
                        "Unknown CTA-861 Data Block (tag 0x{:02x}, length {}).",
                        tag,
                        data.len()
                    )
                });
                return None;
            }
        };

        Some(block)
    }

    fn parse_extended(
        data: &[u8],
        revision: u8,
        flags: &CtaFlags,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        let Some((&extended_tag, data)) = data.split_first() else {
            logger.add_failure("Empty block with extended tag.");
            return None;
        };

        let block = match extended_tag {
            0 => CtaDataBlock::VideoCapability(VideoCapability::parse(
                data, revision, flags, logger,
            )?),
            2 => CtaDataBlock::VesaDisplayDevice,
            5 => CtaDataBlock::Colorimetry(Colorimetry::parse(data, logger)?),
            6 => CtaDataBlock::HdrStaticMetadata(HdrStaticMetadata::parse(data, logger)?),
            7 => CtaDataBlock::HdrDynamicMetadata,
            13 => CtaDataBlock::VideoFormatPreference,
            14 => CtaDataBlock::YCbCr420,
            15 => CtaDataBlock::YCbCr420CapabilityMap,
            18 => CtaDataBlock::HdmiAudio,
            19 => CtaDataBlock::RoomConfiguration,
            20 => CtaDataBlock::SpeakerLocation,
            32 => CtaDataBlock::InfoFrame,
            34 => CtaDataBlock::DisplayIdVideoTimingVII,
            35 => CtaDataBlock::DisplayIdVideoTimingVIII,
            42 => CtaDataBlock::DisplayIdVideoTimingX,
            120 => CtaDataBlock::HdmiEdidExtensionOverride,
            121 => CtaDataBlock::HdmiSinkCapability,
            // Vendor-specific video and audio
            1 | 17 => {
                log::trace!("Skipping vendor-specific data block, extended tag {}", extended_tag);
                return None;
            }
            _ => {
                logger.check(Rule::UnknownCtaDataBlock, revision, || {
                    format!(
                        "Unknown CTA-861 Data Block (extended tag 0x{:02x}, length {}).",
                        extended_tag,
                        data.len()
                    )
                });
                return None;
            }
        };

        Some(block)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(tag: u8, data: &[u8], revision: u8) -> (Option<CtaDataBlock>, String) {
        let mut report = String::new();
        let block = {
            let mut logger = FailureLogger::new(&mut report, "test");
            CtaDataBlock::parse(tag, data, revision, &CtaFlags::default(), &mut logger)
        };
        (block, report)
    }

    #[test]
    fn test_opaque_blocks() {
        assert_eq!(parse(1, &[0x09, 0x07, 0x07], 3).0, Some(CtaDataBlock::Audio));
        assert_eq!(parse(4, &[0x01, 0x00, 0x00], 3).0, Some(CtaDataBlock::SpeakerAllocation));
        assert_eq!(parse(7, &[14, 0x10], 3).0, Some(CtaDataBlock::YCbCr420));
        assert_eq!(
            parse(7, &[121, 0x01, 0x02], 3).0.map(|b| b.name()),
            Some("HDMI Forum Sink Capability Data Block")
        );
    }

    #[test]
    fn test_vendor_specific_is_silent() {
        let (block, report) = parse(3, &[0x03, 0x0C, 0x00], 3);
        assert!(block.is_none());
        assert!(report.is_empty());

        let (block, report) = parse(7, &[1, 0xAA], 3);
        assert!(block.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_unknown_tags() {
        let (block, report) = parse(6, &[0x00, 0x00], 3);
        assert!(block.is_none());
        assert_eq!(
            report,
            "test:\n  Unknown CTA-861 Data Block (tag 0x06, length 2).\n"
        );

        let (_, report) = parse(7, &[0x50, 0x00], 3);
        assert!(report.contains("Unknown CTA-861 Data Block (extended tag 0x50, length 1)."));

        // Tolerated from revision 4 on
        let (block, report) = parse(6, &[0x00], 4);
        assert!(block.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_invalid_payload_drops_block() {
        let (block, report) = parse(5, &[0x00; 3], 3);
        assert!(block.is_none());
        assert!(report.contains("Invalid length 3."));
    }

    #[test]
    fn test_empty_extended_block() {
        let (block, report) = parse(7, &[], 3);
        assert!(block.is_none());
        assert!(report.contains("Empty block with extended tag."));
    }
}
