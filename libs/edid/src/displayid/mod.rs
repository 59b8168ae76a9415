//! DisplayID 1.x section decoder.
//!
//! A section is a 4 byte header (version and revision, payload size,
//! product type, extension count), data blocks, zero padding and a checksum
//! byte.

mod data_block;
mod display_params;
mod type_i_timing;

pub use data_block::*;
pub use display_params::*;
pub use type_i_timing::*;

use serde::Serialize;

use crate::{bits::checksum_ok, bits::get_bit_range, error::EdidError, logger::FailureLogger};

/// Size of the mandatory fields: the header and the checksum.
pub const DISPLAYID_MIN_SIZE: usize = 5;
pub const DISPLAYID_MAX_SIZE: usize = 256;

/// A section payload is at most 251 bytes and a data block at least 3.
pub const DISPLAYID_MAX_DATA_BLOCKS: usize = 83;

/// Tag, revision and payload size.
pub const DATA_BLOCK_HEADER_SIZE: usize = 3;

const SECTION_HEADER_SIZE: usize = DISPLAYID_MIN_SIZE - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayIdProductType {
    /// Extension section
    Extension,
    Test,
    DisplayPanel,
    StandaloneDisplay,
    TvReceiver,
    Repeater,
    DirectDrive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayIdSection {
    pub version: u8,
    pub revision: u8,
    pub product_type: DisplayIdProductType,
    pub data_blocks: Vec<DisplayIdDataBlock>,
}

impl DisplayIdSection {
    /// Decodes the DisplayID section at the start of `data`.
    pub(crate) fn parse(
        data: &[u8],
        logger: &mut FailureLogger,
    ) -> Result<DisplayIdSection, EdidError> {
        if data.len() < DISPLAYID_MIN_SIZE {
            return Err(EdidError::malformed(format!(
                "DisplayID section of {} bytes is too short",
                data.len()
            )));
        }

        let version = get_bit_range(data[0], 7, 4);
        let revision = get_bit_range(data[0], 3, 0);
        if version != 1 {
            return Err(EdidError::unsupported(format!(
                "DisplayID version {}.{} is not supported",
                version, revision
            )));
        }

        let section_size = usize::from(data[1]) + DISPLAYID_MIN_SIZE;
        if section_size > DISPLAYID_MAX_SIZE || section_size > data.len() {
            return Err(EdidError::malformed(format!(
                "DisplayID section size {} exceeds the {} bytes available",
                section_size,
                data.len()
            )));
        }
        let data = &data[..section_size];

        if !checksum_ok(data) {
            return Err(EdidError::malformed("invalid DisplayID checksum"));
        }

        let product_type = match data[2] {
            0 => DisplayIdProductType::Extension,
            1 => DisplayIdProductType::Test,
            2 => DisplayIdProductType::DisplayPanel,
            3 => DisplayIdProductType::StandaloneDisplay,
            4 => DisplayIdProductType::TvReceiver,
            5 => DisplayIdProductType::Repeater,
            6 => DisplayIdProductType::DirectDrive,
            raw => {
                return Err(EdidError::malformed(format!(
                    "unknown DisplayID product type 0x{:02x}",
                    raw
                )));
            }
        };

        let mut section = DisplayIdSection {
            version,
            revision,
            product_type,
            data_blocks: Vec::new(),
        };

        // The last byte is the checksum
        let end = section_size - 1;
        let mut i = SECTION_HEADER_SIZE;
        while i < end {
            let remaining = &data[i..end];
            if is_data_block_end(remaining) {
                break;
            }

            let parsed = DisplayIdDataBlock::parse(remaining, logger);
            if let Some(block) = parsed.block {
                section.data_blocks.push(block);
            }
            i += parsed.size;
        }

        // An overrunning block already consumed the rest of the section
        if let Some(padding) = data.get(i..end) {
            if padding.iter().any(|b| *b != 0) {
                if padding.len() < DATA_BLOCK_HEADER_SIZE {
                    logger.add_failure(format!(
                        "Not enough bytes remain ({}) for a DisplayID data block and the DisplayID filler is non-0.",
                        padding.len()
                    ));
                } else {
                    logger.add_failure("Padding: Contains non-zero bytes.");
                }
            }
        }

        Ok(section)
    }
}

/// Fewer bytes than a header, or an all-zero header, end the data blocks.
fn is_data_block_end(data: &[u8]) -> bool {
    match data.get(..DATA_BLOCK_HEADER_SIZE) {
        Some(header) => header.iter().all(|b| *b == 0),
        None => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    /// Builds a section from data blocks, with a valid checksum.
    fn section(version_revision: u8, product_type: u8, blocks: &[u8]) -> Vec<u8> {
        let mut data = vec![version_revision, blocks.len() as u8, product_type, 0];
        data.extend_from_slice(blocks);
        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        data.push(0u8.wrapping_sub(sum));
        data
    }

    fn parse(data: &[u8]) -> (Result<DisplayIdSection, EdidError>, String) {
        let mut report = String::new();
        let section = {
            let mut logger = FailureLogger::new(&mut report, "Block 1, DisplayID Extension Block");
            DisplayIdSection::parse(data, &mut logger)
        };
        (section, report)
    }

    #[test]
    fn test_version_and_revision() {
        let (section, report) = parse(&section(0x12, 0x03, &[]));
        let section = section.unwrap();

        assert_eq!(section.version, 1);
        assert_eq!(section.revision, 2);
        assert_eq!(section.product_type, DisplayIdProductType::StandaloneDisplay);
        assert!(section.data_blocks.is_empty());
        assert!(report.is_empty());
    }

    #[test]
    fn test_bad_checksum() {
        let mut data = section(0x12, 0x00, &[0x12, 0x00, 0x00]);
        let last = data.len() - 1;
        data[last] = data[last].wrapping_add(1);

        assert_eq!(parse(&data).0.unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(parse(&[0x12, 0x00, 0x00]).0.unwrap_err().kind(), ErrorKind::Malformed);
        assert_eq!(
            parse(&section(0x20, 0x00, &[])).0.unwrap_err().kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            parse(&section(0x12, 0x07, &[])).0.unwrap_err().kind(),
            ErrorKind::Malformed
        );

        // Declares more payload than there is
        let mut data = section(0x12, 0x00, &[]);
        data[1] = 10;
        assert_eq!(parse(&data).0.unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_data_blocks_and_padding() {
        let blocks = [
            // Tiled display topology, opaque
            0x12, 0x00, 0x01, 0xAA,
            // Vendor specific, skipped
            0x7F, 0x00, 0x00,
            // End of data blocks
            0x00, 0x00, 0x00, 0x00,
        ];
        let (section, report) = parse(&section(0x12, 0x00, &blocks));
        let section = section.unwrap();

        assert_eq!(section.data_blocks.len(), 1);
        assert_eq!(section.data_blocks[0].tag, DisplayIdDataBlockTag::TiledDisplayTopology);
        assert!(section.data_blocks.len() <= DISPLAYID_MAX_DATA_BLOCKS);
        assert!(report.is_empty());

        let mut blocks = blocks;
        blocks[10] = 0x01;
        let (section, report) = parse(&self::section(0x12, 0x00, &blocks));
        assert_eq!(section.unwrap().data_blocks.len(), 1);
        assert_eq!(
            report,
            "Block 1, DisplayID Extension Block:\n  Padding: Contains non-zero bytes.\n"
        );
    }

    #[test]
    fn test_short_filler() {
        let (section, report) = parse(&section(0x12, 0x00, &[0x12, 0x00, 0x00, 0x00, 0x01]));
        assert_eq!(section.unwrap().data_blocks.len(), 1);
        assert!(report.contains("Not enough bytes remain (2)"));
    }

    #[test]
    fn test_overrunning_block() {
        let (section, report) = parse(&section(0x12, 0x00, &[0x12, 0x00, 0x05, 0x00]));
        assert!(section.unwrap().data_blocks.is_empty());
        assert!(report.contains("exceeds the number of bytes remaining (4)"));
        assert!(!report.contains("Padding"));
    }

    #[test]
    fn test_trailing_bytes_after_section() {
        // An EDID extension carries the section followed by unused bytes
        let mut data = section(0x12, 0x00, &[]);
        data.resize(126, 0xEE);
        let (section, _) = parse(&data);
        assert!(section.is_ok());
    }
}
