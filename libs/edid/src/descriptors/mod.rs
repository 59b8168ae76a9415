//! Decoders for the four 18 byte "byte descriptors" of the base block.
//!
//! A byte descriptor is either a detailed timing (non-zero pixel clock) or a
//! display descriptor, identified by the tag at offset 3.

mod color;
mod detailed_timing;
mod display_range_limits;
mod established_timings;
mod standard_timing;

pub use color::*;
pub use detailed_timing::*;
pub use display_range_limits::*;
pub use established_timings::*;
pub use standard_timing::*;

use serde::Serialize;

use crate::{dmt::DmtTiming, edid::MiscFeatures, logger::FailureLogger, policy::Rule};

/// Size of a byte descriptor, in bytes.
pub const BYTE_DESCRIPTOR_SIZE: usize = 18;

/// Number of standard timings a standard timing identifications
/// descriptor holds.
pub const DESCRIPTOR_STANDARD_TIMING_COUNT: usize = 6;

/// Maximum length of a text descriptor.
const TEXT_DESCRIPTOR_LEN: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayDescriptorTag {
    ProductSerial = 0xFF,
    DataString = 0xFE,
    RangeLimits = 0xFD,
    ProductName = 0xFC,
    ColorPoint = 0xFB,
    StandardTimingIds = 0xFA,
    ColorManagementData = 0xF9,
    CvtTimingCodes = 0xF8,
    EstablishedTimingsIII = 0xF7,
    Dummy = 0x10,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DisplayDescriptor {
    ProductSerial(String),
    DataString(String),
    ProductName(String),
    RangeLimits(DisplayRangeLimits),
    ColorPoints(Vec<ColorPoint>),
    StandardTimingIds(Vec<StandardTiming>),
    ColorManagementData(ColorManagementData),
    /// Recognized, contents not decoded
    CvtTimingCodes,
    EstablishedTimingsIII(Vec<&'static DmtTiming>),
    Dummy,
}

impl DisplayDescriptor {
    pub fn tag(&self) -> DisplayDescriptorTag {
        match self {
            DisplayDescriptor::ProductSerial(_) => DisplayDescriptorTag::ProductSerial,
            DisplayDescriptor::DataString(_) => DisplayDescriptorTag::DataString,
            DisplayDescriptor::ProductName(_) => DisplayDescriptorTag::ProductName,
            DisplayDescriptor::RangeLimits(_) => DisplayDescriptorTag::RangeLimits,
            DisplayDescriptor::ColorPoints(_) => DisplayDescriptorTag::ColorPoint,
            DisplayDescriptor::StandardTimingIds(_) => DisplayDescriptorTag::StandardTimingIds,
            DisplayDescriptor::ColorManagementData(_) => DisplayDescriptorTag::ColorManagementData,
            DisplayDescriptor::CvtTimingCodes => DisplayDescriptorTag::CvtTimingCodes,
            DisplayDescriptor::EstablishedTimingsIII(_) => {
                DisplayDescriptorTag::EstablishedTimingsIII
            }
            DisplayDescriptor::Dummy => DisplayDescriptorTag::Dummy,
        }
    }

    /// The text of a serial number, data string or product name descriptor.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DisplayDescriptor::ProductSerial(s)
            | DisplayDescriptor::DataString(s)
            | DisplayDescriptor::ProductName(s) => Some(s),
            _ => None,
        }
    }

    /// Decodes a display descriptor. Returns `None` for descriptors which
    /// are dropped: manufacturer specific ones, unknown tags, and range
    /// limits that failed validation.
    pub(crate) fn parse(
        data: &[u8; BYTE_DESCRIPTOR_SIZE],
        revision: u8,
        misc: &MiscFeatures,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        let tag = data[3];
        let descriptor = match tag {
            0xFF => DisplayDescriptor::ProductSerial(decode_text(data)),
            0xFE => DisplayDescriptor::DataString(decode_text(data)),
            0xFC => DisplayDescriptor::ProductName(decode_text(data)),
            0xFD => DisplayDescriptor::RangeLimits(DisplayRangeLimits::parse(
                data, revision, misc, logger,
            )?),
            0xFB => DisplayDescriptor::ColorPoints(parse_color_points(data, logger)),
            0xFA => {
                DisplayDescriptor::StandardTimingIds(parse_standard_timing_ids(data, revision, logger))
            }
            0xF9 => DisplayDescriptor::ColorManagementData(ColorManagementData::parse(
                data, revision, logger,
            )),
            0xF8 => DisplayDescriptor::CvtTimingCodes,
            0xF7 => DisplayDescriptor::EstablishedTimingsIII(parse_established_timings_iii(
                data, revision, logger,
            )),
            0x10 => DisplayDescriptor::Dummy,
            0x00..=0x0F => {
                log::trace!("Skipping manufacturer specific display descriptor 0x{:02x}", tag);
                return None;
            }
            _ => {
                logger.check(Rule::UnknownDisplayDescriptor, revision, || {
                    format!("Unknown Type 0x{:02x}.", tag)
                });
                return None;
            }
        };

        Some(descriptor)
    }
}

/// Text descriptors hold up to 13 bytes, terminated early by a line feed.
fn decode_text(data: &[u8; BYTE_DESCRIPTOR_SIZE]) -> String {
    data[5..5 + TEXT_DESCRIPTOR_LEN]
        .iter()
        .take_while(|b| **b != b'\n' && **b != 0)
        .map(|b| char::from(*b))
        .collect()
}

fn parse_standard_timing_ids(
    data: &[u8; BYTE_DESCRIPTOR_SIZE],
    revision: u8,
    logger: &mut FailureLogger,
) -> Vec<StandardTiming> {
    let timings = (0..DESCRIPTOR_STANDARD_TIMING_COUNT)
        .filter_map(|i| {
            let offset = 5 + i * STANDARD_TIMING_SIZE;
            StandardTiming::parse([data[offset], data[offset + 1]], revision, logger)
        })
        .collect();

    if data[17] != 0x0A {
        logger.check(Rule::StandardTimingsTerminator, revision, || {
            "Standard Timing Identifications: Last byte must be a line feed."
        });
    }

    timings
}

#[cfg(test)]
mod test {
    use super::*;

    fn raw_descriptor(tag: u8, payload: &[u8]) -> [u8; 18] {
        let mut data = [0u8; 18];
        data[3] = tag;
        data[5..5 + payload.len()].copy_from_slice(payload);
        data
    }

    fn parse(data: &[u8; 18], revision: u8) -> (Option<DisplayDescriptor>, String) {
        let mut report = String::new();
        let descriptor = {
            let mut logger = FailureLogger::new(&mut report, "test");
            DisplayDescriptor::parse(data, revision, &MiscFeatures::default(), &mut logger)
        };
        (descriptor, report)
    }

    #[test]
    fn test_product_name() {
        let (descriptor, _) = parse(&raw_descriptor(0xFC, b"DELL U2720Q\n "), 4);
        let descriptor = descriptor.unwrap();

        assert_eq!(descriptor.tag(), DisplayDescriptorTag::ProductName);
        assert_eq!(descriptor.as_str(), Some("DELL U2720Q"));
    }

    #[test]
    fn test_full_length_text() {
        let (descriptor, _) = parse(&raw_descriptor(0xFF, b"0123456789ABC"), 4);
        assert_eq!(descriptor.unwrap().as_str(), Some("0123456789ABC"));
    }

    #[test]
    fn test_standard_timing_ids() {
        let mut data = raw_descriptor(
            0xFA,
            &[0x81, 0x80, 0x01, 0x01, 0xD1, 0xC0, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01],
        );
        data[17] = 0x0A;
        let (descriptor, report) = parse(&data, 4);

        let Some(DisplayDescriptor::StandardTimingIds(timings)) = descriptor else {
            panic!("expected standard timing identifications");
        };
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].horizontal_resolution, 1280);
        assert_eq!(timings[1].horizontal_resolution, 1920);
        assert!(report.is_empty());
    }

    #[test]
    fn test_standard_timing_ids_terminator() {
        let data = raw_descriptor(0xFA, &[0x01; 12]);
        let (_, report) = parse(&data, 4);
        assert!(report.contains("Last byte must be a line feed."));
    }

    #[test]
    fn test_manufacturer_specific_is_silent() {
        let (descriptor, report) = parse(&raw_descriptor(0x05, &[]), 4);
        assert!(descriptor.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_unknown_tag() {
        let (descriptor, report) = parse(&raw_descriptor(0x42, &[]), 3);
        assert!(descriptor.is_none());
        assert_eq!(report, "test:\n  Unknown Type 0x42.\n");

        let (descriptor, report) = parse(&raw_descriptor(0x42, &[]), 5);
        assert!(descriptor.is_none());
        assert!(report.is_empty());
    }

    #[test]
    fn test_dummy_and_cvt_codes() {
        assert_eq!(parse(&raw_descriptor(0x10, &[]), 4).0, Some(DisplayDescriptor::Dummy));
        assert_eq!(
            parse(&raw_descriptor(0xF8, &[]), 4).0,
            Some(DisplayDescriptor::CvtTimingCodes)
        );
    }
}
