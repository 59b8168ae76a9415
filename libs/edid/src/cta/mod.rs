//! CTA-861 extension block decoder.
//!
//! Layout of the 128 byte block: a 4 byte header (tag, revision, DTD start
//! offset, flags), a run of data blocks up to the DTD start offset, then up
//! to six detailed timing descriptors and zero padding.

mod color;
mod data_block;
mod hdr;
mod video;

pub use color::*;
pub use data_block::*;
pub use hdr::*;
pub use video::*;

use serde::Serialize;

use crate::{
    BLOCK_SIZE,
    bits::{get_bit_range, has_bit},
    descriptors::{DETAILED_TIMING_SIZE, DetailedTimingDef},
    error::EdidError,
    logger::FailureLogger,
    policy::Rule,
};

pub const CTA_HEADER_SIZE: usize = 4;

/// Offset of the checksum byte, where the detailed timings region ends.
pub const CTA_DTD_END: usize = 127;

/// Maximum number of detailed timings in a CTA-861 block.
pub const CTA_MAX_DETAILED_TIMING_DEFS: usize = (CTA_DTD_END - CTA_HEADER_SIZE) / DETAILED_TIMING_SIZE;

/// Header byte 3. All fields are zero for revision 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CtaFlags {
    /// The sink underscans IT video formats by default
    pub it_underscan: bool,
    pub basic_audio: bool,
    /// YCbCr 4:4:4 supported in addition to RGB
    pub ycc444: bool,
    /// YCbCr 4:2:2 supported in addition to RGB
    pub ycc422: bool,
    /// Total number of native detailed timings
    pub native_dtds: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtaBlock {
    /// Also called "version" by CTA-861
    pub revision: u8,
    pub flags: CtaFlags,
    pub data_blocks: Vec<CtaDataBlock>,
    pub detailed_timing_defs: Vec<DetailedTimingDef>,
}

impl CtaBlock {
    pub(crate) fn parse(
        data: &[u8; BLOCK_SIZE],
        logger: &mut FailureLogger,
    ) -> Result<CtaBlock, EdidError> {
        let revision = data[1];
        let dtd_start = usize::from(data[2]);
        let raw_flags = data[3];

        let mut cta = CtaBlock {
            revision,
            flags: CtaFlags::default(),
            data_blocks: Vec::new(),
            detailed_timing_defs: Vec::new(),
        };

        if revision >= 2 {
            cta.flags = CtaFlags {
                it_underscan: has_bit(raw_flags, 7),
                basic_audio: has_bit(raw_flags, 6),
                ycc444: has_bit(raw_flags, 5),
                ycc422: has_bit(raw_flags, 4),
                native_dtds: get_bit_range(raw_flags, 3, 0),
            };
        } else if raw_flags != 0 {
            logger.check(Rule::CtaFlagsBeforeRevision2, revision, || "Non-zero byte 3.");
        }

        // No data blocks and no detailed timings
        if dtd_start == 0 {
            return Ok(cta);
        }
        if !(CTA_HEADER_SIZE..=CTA_DTD_END).contains(&dtd_start) {
            return Err(EdidError::malformed(format!(
                "CTA-861 detailed timing offset {} is out of bounds",
                dtd_start
            )));
        }

        let mut i = CTA_HEADER_SIZE;
        while i < dtd_start {
            let header = data[i];
            let tag = get_bit_range(header, 7, 5);
            let len = usize::from(get_bit_range(header, 4, 0));

            if i + 1 + len > dtd_start {
                return Err(EdidError::malformed(format!(
                    "CTA-861 data block at offset {} overruns the detailed timings at {}",
                    i, dtd_start
                )));
            }

            let payload = &data[i + 1..i + 1 + len];
            if let Some(block) = CtaDataBlock::parse(tag, payload, revision, &cta.flags, logger) {
                log::trace!("CTA-861 data block at offset {}: {}", i, block.name());
                cta.data_blocks.push(block);
            }

            i += 1 + len;
        }

        let mut i = dtd_start;
        while i + DETAILED_TIMING_SIZE <= CTA_DTD_END && data[i] != 0 {
            let Ok(raw) = <&[u8; DETAILED_TIMING_SIZE]>::try_from(&data[i..i + DETAILED_TIMING_SIZE])
            else {
                break;
            };
            cta.detailed_timing_defs.push(DetailedTimingDef::parse(raw));
            i += DETAILED_TIMING_SIZE;
        }

        if data[i..CTA_DTD_END].iter().any(|b| *b != 0) {
            logger.add_failure("Padding: Contains non-zero bytes.");
        }

        Ok(cta)
    }

    /// Short video descriptors of all Video Data Blocks, in order.
    pub fn svds(&self) -> impl Iterator<Item = &ShortVideoDescriptor> {
        self.data_blocks.iter().flat_map(|block| match block {
            CtaDataBlock::Video(svds) => svds.as_slice(),
            _ => &[][..],
        })
    }
}
