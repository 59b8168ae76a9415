use serde::Serialize;

use crate::{bits::get_bit_range, logger::FailureLogger, policy::Rule};

use super::{
    DATA_BLOCK_HEADER_SIZE, DisplayParams, TypeITiming, type_i_timing::parse_type_i_timing_block,
};

/// DisplayID 1.3 data block tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayIdDataBlockTag {
    ProductId = 0x00,
    DisplayParams = 0x01,
    ColorCharacteristics = 0x02,
    TypeITiming = 0x03,
    TypeIITiming = 0x04,
    TypeIIITiming = 0x05,
    TypeIVTiming = 0x06,
    VesaTiming = 0x07,
    CeaTiming = 0x08,
    TimingRangeLimits = 0x09,
    ProductSerial = 0x0A,
    AsciiString = 0x0B,
    DisplayDeviceData = 0x0C,
    InterfacePowerSequencing = 0x0D,
    TransferCharacteristics = 0x0E,
    DisplayInterface = 0x0F,
    StereoDisplayInterface = 0x10,
    TypeVTiming = 0x11,
    TiledDisplayTopology = 0x12,
    TypeVITiming = 0x13,
}

impl DisplayIdDataBlockTag {
    fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0x00 => Self::ProductId,
            0x01 => Self::DisplayParams,
            0x02 => Self::ColorCharacteristics,
            0x03 => Self::TypeITiming,
            0x04 => Self::TypeIITiming,
            0x05 => Self::TypeIIITiming,
            0x06 => Self::TypeIVTiming,
            0x07 => Self::VesaTiming,
            0x08 => Self::CeaTiming,
            0x09 => Self::TimingRangeLimits,
            0x0A => Self::ProductSerial,
            0x0B => Self::AsciiString,
            0x0C => Self::DisplayDeviceData,
            0x0D => Self::InterfacePowerSequencing,
            0x0E => Self::TransferCharacteristics,
            0x0F => Self::DisplayInterface,
            0x10 => Self::StereoDisplayInterface,
            0x11 => Self::TypeVTiming,
            0x12 => Self::TiledDisplayTopology,
            0x13 => Self::TypeVITiming,
            _ => return None,
        })
    }

    /// Highest block revision this decoder knows for the tag.
    fn max_revision(self) -> u8 {
        match self {
            DisplayIdDataBlockTag::TypeITiming
            | DisplayIdDataBlockTag::DisplayParams
            | DisplayIdDataBlockTag::ProductId => 0,
            _ => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayIdDataBlockPayload {
    DisplayParams(DisplayParams),
    TypeITiming(Vec<TypeITiming>),
    /// Recognized, contents not decoded
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayIdDataBlock {
    pub tag: DisplayIdDataBlockTag,
    pub revision: u8,
    pub payload: DisplayIdDataBlockPayload,
}

/// The result of decoding one data block.
pub(crate) struct ParsedDataBlock {
    /// Bytes consumed, header included
    pub size: usize,
    /// `None` if the block was skipped
    pub block: Option<DisplayIdDataBlock>,
}

impl DisplayIdDataBlock {
    /// Decodes the data block at the start of `data`, which holds the rest
    /// of the section's data block area (at least a header).
    pub(crate) fn parse(data: &[u8], logger: &mut FailureLogger) -> ParsedDataBlock {
        let raw_tag = data[0];
        let size = usize::from(data[2]) + DATA_BLOCK_HEADER_SIZE;

        if size > data.len() {
            logger.add_failure(format!(
                "The length of this DisplayID data block ({}) exceeds the number of bytes remaining ({})",
                size,
                data.len()
            ));
            return ParsedDataBlock { size, block: None };
        }
        let data = &data[..size];

        if raw_tag == 0x7F {
            log::trace!("Skipping vendor-specific DisplayID data block");
            return ParsedDataBlock { size, block: None };
        }

        let Some(tag) = DisplayIdDataBlockTag::from_raw(raw_tag) else {
            logger.check(Rule::UnknownDisplayIdDataBlock, 0, || {
                format!(
                    "Unknown DisplayID Data Block (0x{:x}, length {})",
                    raw_tag,
                    size - DATA_BLOCK_HEADER_SIZE
                )
            });
            return ParsedDataBlock { size, block: None };
        };

        // Bits 2:0 are the block revision, the rest are per-block flags
        let revision = get_bit_range(data[1], 2, 0);
        if revision > tag.max_revision() {
            logger.check(Rule::DisplayIdDataBlockRevision, 0, || {
                format!(
                    "{:?} Data Block: Unexpected revision ({} != {}).",
                    tag,
                    revision,
                    tag.max_revision()
                )
            });
        }
        if matches!(tag, DisplayIdDataBlockTag::DisplayParams | DisplayIdDataBlockTag::TypeITiming)
            && get_bit_range(data[1], 7, 3) != 0
        {
            logger.add_failure(format!("{:?} Data Block: Reserved flag bits are set.", tag));
        }

        let payload = match tag {
            DisplayIdDataBlockTag::DisplayParams => match DisplayParams::parse(data, logger) {
                Some(params) => DisplayIdDataBlockPayload::DisplayParams(params),
                None => return ParsedDataBlock { size, block: None },
            },
            DisplayIdDataBlockTag::TypeITiming => match parse_type_i_timing_block(data, logger) {
                Some(timings) => DisplayIdDataBlockPayload::TypeITiming(timings),
                None => return ParsedDataBlock { size, block: None },
            },
            _ => DisplayIdDataBlockPayload::Opaque,
        };

        ParsedDataBlock {
            size,
            block: Some(DisplayIdDataBlock {
                tag,
                revision,
                payload,
            }),
        }
    }
}
