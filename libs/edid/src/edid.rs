use serde::Serialize;

use crate::{
    BLOCK_SIZE, MAX_BLOCK_COUNT,
    bits::{checksum_ok, get_bit_range, has_bit, le16},
    cta::CtaBlock,
    descriptors::{
        BYTE_DESCRIPTOR_SIZE, DetailedTimingDef, DisplayDescriptor, EstablishedTimingSupport,
        STANDARD_TIMING_SIZE, StandardTiming, decode_chromaticity_coord, decode_gamma,
    },
    displayid::DisplayIdSection,
    error::EdidError,
    logger::FailureLogger,
    policy::Rule,
};

/// Number of standard timings in the base block.
pub const STANDARD_TIMING_COUNT: usize = 8;

/// Number of byte descriptors in the base block.
pub const BYTE_DESCRIPTOR_COUNT: usize = 4;

const STANDARD_TIMINGS_OFFSET: usize = 0x26;
const BYTE_DESCRIPTORS_OFFSET: usize = 0x36;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorProduct {
    /// A 3 character PNP manufacturer ID
    pub manufacturer_id: String,

    /// A product code, usually represented as a 4-digit hex number
    pub product_code: u16,

    /// A 4 byte serial number, zero if unused
    pub serial: u32,

    /// Week of manufacture, 1 to 54
    pub manufacture_week: Option<u8>,
    pub manufacture_year: Option<i32>,

    /// Set instead of the manufacture date when the week byte is 0xFF
    pub model_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DigitalVideoInterface {
    Undefined,
    Dvi,
    HdmiA,
    HdmiB,
    Mddi,
    DisplayPort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DigitalVideoInput {
    /// VESA DFP 1.x compatible, EDID 1.2 and 1.3 only
    pub dfp1: bool,
    /// Bits per primary color, EDID 1.4 only
    pub color_bit_depth: Option<u8>,
    /// EDID 1.4 only, `Undefined` before that
    pub interface: DigitalVideoInterface,
}

/// Video white and sync levels, relative to blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalLevelStandard {
    /// +0.7/-0.3 V
    L0_700_0_300,
    /// +0.714/-0.286 V
    L0_714_0_286,
    /// +1.0/-0.4 V
    L1_000_0_400,
    /// +0.7/0 V
    L0_700_0_000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalogVideoInput {
    pub signal_level_std: SignalLevelStandard,
    /// Blank-to-black setup or pedestal expected
    pub video_setup: bool,
    pub sync_separate: bool,
    pub sync_composite: bool,
    pub sync_on_green: bool,
    /// Serrations on the V-sync pulse are required
    pub sync_serrations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoInput {
    Analog(AnalogVideoInput),
    Digital(DigitalVideoInput),
}

/// Bytes 0x15 and 0x16 hold either a physical size or, since EDID 1.4, an
/// aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ScreenSize {
    Undefined,
    Size { width_cm: i32, height_cm: i32 },
    LandscapeAspectRatio(f32),
    PortraitAspectRatio(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DpmsFeatures {
    pub standby: bool,
    pub suspend: bool,
    /// Active-off
    pub off: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayColorType {
    MonochromeOrGrayscale,
    RgbColor,
    NonRgbColor,
    Undefined,
}

/// Supported color encodings of a digital EDID 1.4 display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorEncodingFormats {
    pub rgb444: bool,
    pub ycrcb444: bool,
    pub ycrcb422: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MiscFeatures {
    /// The first detailed timing is the preferred timing. Always true
    /// since EDID 1.4.
    pub has_preferred_timing: bool,
    /// Default GTF supported, EDID 1.3 and earlier
    pub default_gtf: bool,
    /// Continuous frequency display, EDID 1.4 and later
    pub continuous_freq: bool,
    /// The preferred timing is the native pixel format, EDID 1.4 and later
    pub preferred_timing_is_native: bool,
    /// sRGB is the default color space
    pub srgb_is_primary: bool,
}

/// CIE 1931 coordinates of the primaries and the default white point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChromaticityCoords {
    pub red_x: f32,
    pub red_y: f32,
    pub green_x: f32,
    pub green_y: f32,
    pub blue_x: f32,
    pub blue_y: f32,
    pub white_x: f32,
    pub white_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtensionTag {
    /// CEA 861 series extension
    Cea = 0x02,
    /// Video timing block extension
    Vtb = 0x10,
    /// Display information extension
    Di = 0x40,
    /// Localized string extension
    Ls = 0x50,
    /// Digital packet video link extension
    Dpvl = 0x60,
    DisplayId = 0x70,
    BlockMap = 0xF0,
    /// Defined by the display manufacturer
    Vendor = 0xFF,
}

/// A trailing 128 byte block. Only CTA-861 and DisplayID blocks are decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExtensionBlock {
    Cta(CtaBlock),
    DisplayId(DisplayIdSection),
    Vtb,
    Di,
    Ls,
    Dpvl,
    BlockMap,
    Vendor,
}

impl ExtensionBlock {
    pub fn tag(&self) -> ExtensionTag {
        match self {
            ExtensionBlock::Cta(_) => ExtensionTag::Cea,
            ExtensionBlock::DisplayId(_) => ExtensionTag::DisplayId,
            ExtensionBlock::Vtb => ExtensionTag::Vtb,
            ExtensionBlock::Di => ExtensionTag::Di,
            ExtensionBlock::Ls => ExtensionTag::Ls,
            ExtensionBlock::Dpvl => ExtensionTag::Dpvl,
            ExtensionBlock::BlockMap => ExtensionTag::BlockMap,
            ExtensionBlock::Vendor => ExtensionTag::Vendor,
        }
    }

    pub fn cta(&self) -> Option<&CtaBlock> {
        match self {
            ExtensionBlock::Cta(cta) => Some(cta),
            _ => None,
        }
    }

    pub fn displayid(&self) -> Option<&DisplayIdSection> {
        match self {
            ExtensionBlock::DisplayId(section) => Some(section),
            _ => None,
        }
    }
}

/// A decoded EDID blob: the base block and its extensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edid {
    /// EDID version (major), always 1
    pub version: u8,
    /// EDID revision (minor), typically 3 or 4
    pub revision: u8,

    pub vendor_product: VendorProduct,
    pub video_input: VideoInput,
    pub screen_size: ScreenSize,

    /// Display transfer characteristic. `None` if defined in an extension.
    pub gamma: Option<f32>,

    pub dpms: DpmsFeatures,
    pub display_color_type: DisplayColorType,
    /// Only set for digital EDID 1.4 displays
    pub color_encoding_formats: Option<ColorEncodingFormats>,
    pub misc_features: MiscFeatures,
    pub chromaticity_coords: ChromaticityCoords,

    /// Legacy timing options supported
    pub established_timings: EstablishedTimingSupport,

    /// Used slots of the 8 standard timing slots
    pub standard_timings: Vec<StandardTiming>,

    /// Detailed timings from the byte descriptors. The first one is the
    /// preferred timing if `misc_features.has_preferred_timing` is set.
    pub detailed_timing_defs: Vec<DetailedTimingDef>,
    pub display_descriptors: Vec<DisplayDescriptor>,

    pub extensions: Vec<ExtensionBlock>,

    /// Conformance report, `None` if no failure was found
    pub failure_msg: Option<String>,
}

/// The EDID header sequence
const HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

impl Edid {
    /// Decodes an EDID blob: a base block followed by zero or more extension
    /// blocks.
    ///
    /// Structural problems are returned as errors; everything else is
    /// decoded on a best effort basis and reported in `failure_msg`.
    pub fn parse(data: &[u8]) -> Result<Edid, EdidError> {
        if data.len() < BLOCK_SIZE
            || data.len() > MAX_BLOCK_COUNT * BLOCK_SIZE
            || data.len() % BLOCK_SIZE != 0
        {
            return Err(EdidError::malformed(format!(
                "invalid EDID size {}",
                data.len()
            )));
        }

        let (base, extension_data) = data.split_at(BLOCK_SIZE);

        if base[..HEADER.len()] != HEADER {
            return Err(EdidError::malformed("invalid EDID header"));
        }

        let version = base[0x12];
        let revision = base[0x13];
        if version != 1 {
            // Later versions break the structure entirely
            return Err(EdidError::unsupported(format!(
                "EDID version {} is not supported",
                version
            )));
        }

        if !checksum_ok(base) {
            return Err(EdidError::malformed("invalid base block checksum"));
        }

        let extension_count = usize::from(base[0x7E]);
        if extension_count != extension_data.len() / BLOCK_SIZE {
            return Err(EdidError::malformed(format!(
                "extension count is {} but {} extension blocks follow",
                extension_count,
                extension_data.len() / BLOCK_SIZE
            )));
        }

        log::trace!(
            "Decoding EDID {}.{} with {} extension block(s)",
            version,
            revision,
            extension_count
        );

        let mut report = String::new();
        let mut logger = FailureLogger::new(&mut report, "Block 0, Base EDID");

        let vendor_product = parse_vendor_product(base, revision, &mut logger);
        let video_input = parse_video_input(base[0x14], revision, &mut logger);
        let screen_size = parse_screen_size(base[0x15], base[0x16], revision);
        let gamma = decode_gamma(base[0x17]);

        let features = base[0x18];
        let is_digital = matches!(video_input, VideoInput::Digital(_));
        let dpms = DpmsFeatures {
            standby: has_bit(features, 7),
            suspend: has_bit(features, 6),
            off: has_bit(features, 5),
        };
        let (display_color_type, color_encoding_formats) = if is_digital && revision >= 4 {
            let formats = ColorEncodingFormats {
                rgb444: true,
                ycrcb444: has_bit(features, 3),
                ycrcb422: has_bit(features, 4),
            };
            (DisplayColorType::Undefined, Some(formats))
        } else {
            let color_type = match get_bit_range(features, 4, 3) {
                0 => DisplayColorType::MonochromeOrGrayscale,
                1 => DisplayColorType::RgbColor,
                2 => DisplayColorType::NonRgbColor,
                _ => DisplayColorType::Undefined,
            };
            (color_type, None)
        };
        let misc_features = parse_misc_features(features, revision);

        let chromaticity_coords = parse_chromaticity_coords(base, &mut logger);
        let established_timings =
            EstablishedTimingSupport::parse([base[0x23], base[0x24], base[0x25]]);

        let standard_timings = (0..STANDARD_TIMING_COUNT)
            .filter_map(|i| {
                let offset = STANDARD_TIMINGS_OFFSET + i * STANDARD_TIMING_SIZE;
                StandardTiming::parse([base[offset], base[offset + 1]], revision, &mut logger)
            })
            .collect();

        let mut detailed_timing_defs = Vec::new();
        let mut display_descriptors = Vec::new();
        for descriptor in base[BYTE_DESCRIPTORS_OFFSET..]
            .chunks_exact(BYTE_DESCRIPTOR_SIZE)
            .take(BYTE_DESCRIPTOR_COUNT)
        {
            let Ok(descriptor) = <&[u8; BYTE_DESCRIPTOR_SIZE]>::try_from(descriptor) else {
                continue;
            };

            if descriptor[0] != 0 || descriptor[1] != 0 {
                if !display_descriptors.is_empty() {
                    // A detailed timing can't follow a display descriptor
                    logger.add_failure("Invalid detailed timing descriptor ordering.");
                }
                detailed_timing_defs.push(DetailedTimingDef::parse(descriptor));
                continue;
            }

            if detailed_timing_defs.is_empty() {
                logger.check(Rule::PreferredTimingMissing, revision, || {
                    "The first byte descriptor must contain the preferred timing."
                });
            }

            if let Some(display_descriptor) =
                DisplayDescriptor::parse(descriptor, revision, &misc_features, &mut logger)
            {
                display_descriptors.push(display_descriptor);
            }
        }

        let mut extensions = Vec::with_capacity(extension_count);
        for block in extension_data.chunks_exact(BLOCK_SIZE) {
            let Ok(block) = <&[u8; BLOCK_SIZE]>::try_from(block) else {
                continue;
            };
            if let Some(extension) = parse_extension(block, extensions.len() + 1, revision, &mut logger)? {
                extensions.push(extension);
            }
        }

        Ok(Edid {
            version,
            revision,
            vendor_product,
            video_input,
            screen_size,
            gamma,
            dpms,
            display_color_type,
            color_encoding_formats,
            misc_features,
            chromaticity_coords,
            established_timings,
            standard_timings,
            detailed_timing_defs,
            display_descriptors,
            extensions,
            failure_msg: if report.is_empty() { None } else { Some(report) },
        })
    }

    /// The preferred timing, if the display advertises one.
    pub fn preferred_timing(&self) -> Option<&DetailedTimingDef> {
        if self.misc_features.has_preferred_timing {
            self.detailed_timing_defs.first()
        } else {
            None
        }
    }

    /// The first product name display descriptor, if any.
    pub fn product_name(&self) -> Option<&str> {
        self.display_descriptors.iter().find_map(|d| match d {
            DisplayDescriptor::ProductName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// The first product serial display descriptor, if any.
    pub fn serial_string(&self) -> Option<&str> {
        self.display_descriptors.iter().find_map(|d| match d {
            DisplayDescriptor::ProductSerial(serial) => Some(serial.as_str()),
            _ => None,
        })
    }
}

fn parse_vendor_product(base: &[u8], revision: u8, logger: &mut FailureLogger) -> VendorProduct {
    // Three 5-bit letters, 'A' = 1, big-endian
    //
    //    | CH1  |   CH2  |  CH3 |
    //  |0 00001   00 010   00011|
    //  |   Byte 1   |   Byte 2  |
    let man = u16::from_be_bytes([base[0x08], base[0x09]]);
    let manufacturer_id = [10u16, 5, 0]
        .iter()
        .map(|shift| char::from(((man >> shift) & 0x1F) as u8 + b'@'))
        .collect();

    let raw_week = base[0x10];
    let raw_year = base[0x11];

    let year = if raw_year >= 0x10 || revision < 4 {
        Some(i32::from(raw_year) + 1990)
    } else {
        logger.check(Rule::ReservedManufactureYear, revision, || {
            "Year set to reserved value."
        });
        None
    };

    let mut vendor_product = VendorProduct {
        manufacturer_id,
        product_code: le16(base[0x0A], base[0x0B]),
        serial: u32::from_le_bytes([base[0x0C], base[0x0D], base[0x0E], base[0x0F]]),
        manufacture_week: None,
        manufacture_year: None,
        model_year: None,
    };

    if raw_week == 0xFF {
        vendor_product.model_year = year;
    } else {
        vendor_product.manufacture_year = year;
        if raw_week > 54 {
            logger.check(Rule::InvalidManufactureWeek, revision, || {
                format!("Invalid week {} of manufacture.", raw_week)
            });
        } else if raw_week > 0 {
            vendor_product.manufacture_week = Some(raw_week);
        }
    }

    vendor_product
}

fn parse_video_input(video_input: u8, revision: u8, logger: &mut FailureLogger) -> VideoInput {
    if !has_bit(video_input, 7) {
        let signal_level_std = match get_bit_range(video_input, 6, 5) {
            0 => SignalLevelStandard::L0_700_0_300,
            1 => SignalLevelStandard::L0_714_0_286,
            2 => SignalLevelStandard::L1_000_0_400,
            _ => SignalLevelStandard::L0_700_0_000,
        };
        return VideoInput::Analog(AnalogVideoInput {
            signal_level_std,
            video_setup: has_bit(video_input, 4),
            sync_separate: has_bit(video_input, 3),
            sync_composite: has_bit(video_input, 2),
            sync_on_green: has_bit(video_input, 1),
            sync_serrations: has_bit(video_input, 0),
        });
    }

    let mut digital = DigitalVideoInput {
        dfp1: false,
        color_bit_depth: None,
        interface: DigitalVideoInterface::Undefined,
    };

    if revision < 4 {
        // EDID 1.2 and 1.3 only define the DFP bit, earlier revisions nothing
        let reserved = if revision < 2 {
            get_bit_range(video_input, 6, 0)
        } else {
            digital.dfp1 = has_bit(video_input, 0);
            get_bit_range(video_input, 6, 1)
        };
        if reserved != 0 {
            logger.check(Rule::DigitalInputReservedBits, revision, || {
                format!(
                    "Digital Video Interface Standard set to reserved value 0x{:02x}.",
                    video_input
                )
            });
        }
        return VideoInput::Digital(digital);
    }

    match get_bit_range(video_input, 6, 4) {
        0 => {}
        0x07 => {
            logger.check(Rule::ReservedColorBitDepth, revision, || {
                "Color Bit Depth set to reserved value."
            });
        }
        depth => digital.color_bit_depth = Some(2 * depth + 4),
    }

    let interface = get_bit_range(video_input, 3, 0);
    digital.interface = match interface {
        0 => DigitalVideoInterface::Undefined,
        1 => DigitalVideoInterface::Dvi,
        2 => DigitalVideoInterface::HdmiA,
        3 => DigitalVideoInterface::HdmiB,
        4 => DigitalVideoInterface::Mddi,
        5 => DigitalVideoInterface::DisplayPort,
        _ => {
            logger.check(Rule::ReservedDigitalInterface, revision, || {
                format!(
                    "Digital Video Interface Standard set to reserved value 0x{:02x}.",
                    interface
                )
            });
            DigitalVideoInterface::Undefined
        }
    };

    VideoInput::Digital(digital)
}

fn parse_screen_size(width: u8, height: u8, revision: u8) -> ScreenSize {
    // 1.3 leaves the size undefined if either byte is zero, 1.4 encodes an
    // aspect ratio in the non-zero one
    if width > 0 && height > 0 {
        ScreenSize::Size {
            width_cm: i32::from(width),
            height_cm: i32::from(height),
        }
    } else if revision >= 4 && width > 0 {
        ScreenSize::LandscapeAspectRatio((f32::from(width) + 99.0) / 100.0)
    } else if revision >= 4 && height > 0 {
        ScreenSize::PortraitAspectRatio((f32::from(height) + 99.0) / 100.0)
    } else {
        ScreenSize::Undefined
    }
}

fn parse_misc_features(features: u8, revision: u8) -> MiscFeatures {
    let srgb_is_primary = has_bit(features, 2);
    if revision >= 4 {
        MiscFeatures {
            has_preferred_timing: true,
            default_gtf: false,
            continuous_freq: has_bit(features, 0),
            preferred_timing_is_native: has_bit(features, 1),
            srgb_is_primary,
        }
    } else {
        MiscFeatures {
            has_preferred_timing: has_bit(features, 1),
            default_gtf: has_bit(features, 0),
            continuous_freq: false,
            preferred_timing_is_native: false,
            srgb_is_primary,
        }
    }
}

fn parse_chromaticity_coords(base: &[u8], logger: &mut FailureLogger) -> ChromaticityCoords {
    let lo = base[0x19];
    let hi = base[0x1A];

    let coords = ChromaticityCoords {
        red_x: decode_chromaticity_coord(base[0x1B], get_bit_range(lo, 7, 6)),
        red_y: decode_chromaticity_coord(base[0x1C], get_bit_range(lo, 5, 4)),
        green_x: decode_chromaticity_coord(base[0x1D], get_bit_range(lo, 3, 2)),
        green_y: decode_chromaticity_coord(base[0x1E], get_bit_range(lo, 1, 0)),
        blue_x: decode_chromaticity_coord(base[0x1F], get_bit_range(hi, 7, 6)),
        blue_y: decode_chromaticity_coord(base[0x20], get_bit_range(hi, 5, 4)),
        white_x: decode_chromaticity_coord(base[0x21], get_bit_range(hi, 3, 2)),
        white_y: decode_chromaticity_coord(base[0x22], get_bit_range(hi, 1, 0)),
    };

    // Either all or none of the primaries
    let primaries = [
        coords.red_x,
        coords.red_y,
        coords.green_x,
        coords.green_y,
        coords.blue_x,
        coords.blue_y,
    ];
    let any_set = primaries.iter().any(|c| *c != 0.0);
    let all_set = primaries.iter().all(|c| *c != 0.0);
    if any_set && !all_set {
        logger.add_failure("Some but not all primaries coordinates are unset.");
    }

    if coords.white_x == 0.0 || coords.white_y == 0.0 {
        logger.add_failure("White-point coordinates are unset.");
    }

    coords
}

/// Decodes one extension block. `index` is the 1-based position the block
/// will have once added, used to label its report section.
fn parse_extension(
    block: &[u8; BLOCK_SIZE],
    index: usize,
    revision: u8,
    logger: &mut FailureLogger,
) -> Result<Option<ExtensionBlock>, EdidError> {
    if !checksum_ok(block) {
        return Err(EdidError::malformed(format!(
            "invalid checksum in extension block {}",
            index
        )));
    }

    let tag = block[0];
    log::trace!("Extension block {} has tag 0x{:02x}", index, tag);

    let extension = match tag {
        0x02 => {
            let cta = logger.in_section(format!("Block {}, CTA-861 Extension Block", index), |logger| {
                CtaBlock::parse(block, logger)
            })?;
            ExtensionBlock::Cta(cta)
        }
        0x70 => {
            // The section starts after the tag, the last byte is the block checksum
            let section = logger.in_section(
                format!("Block {}, DisplayID Extension Block", index),
                |logger| DisplayIdSection::parse(&block[1..BLOCK_SIZE - 1], logger),
            )?;
            ExtensionBlock::DisplayId(section)
        }
        0x10 => ExtensionBlock::Vtb,
        0x40 => ExtensionBlock::Di,
        0x50 => ExtensionBlock::Ls,
        0x60 => ExtensionBlock::Dpvl,
        0xF0 => ExtensionBlock::BlockMap,
        0xFF => ExtensionBlock::Vendor,
        _ => {
            logger.check(Rule::UnknownExtensionBlock, revision, || "Unknown Extension Block.");
            return Ok(None);
        }
    };

    Ok(Some(extension))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        descriptors::{DisplayRangeLimits, RangeLimitsType},
        error::ErrorKind,
        test_util::{append_extension, base_block, fix_checksum},
    };

    const DUMMY_DESCRIPTOR: [u8; 18] = [0, 0, 0, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

    fn parse_block(block: [u8; BLOCK_SIZE]) -> Edid {
        Edid::parse(&block).unwrap()
    }

    fn with_base(f: impl FnOnce(&mut [u8; BLOCK_SIZE])) -> Edid {
        let mut block = base_block();
        f(&mut block);
        fix_checksum(&mut block);
        parse_block(block)
    }

    #[test]
    fn test_conformant_base_block() {
        let edid = parse_block(base_block());

        assert_eq!(edid.version, 1);
        assert_eq!(edid.revision, 4);
        assert_eq!(edid.failure_msg, None);

        assert_eq!(edid.vendor_product.manufacturer_id, "DEL");
        assert_eq!(edid.vendor_product.product_code, 0x4123);
        assert_eq!(edid.vendor_product.serial, 0x1234_5678);
        assert_eq!(edid.vendor_product.manufacture_week, Some(12));
        assert_eq!(edid.vendor_product.manufacture_year, Some(2020));
        assert_eq!(edid.vendor_product.model_year, None);

        assert_eq!(
            edid.video_input,
            VideoInput::Digital(DigitalVideoInput {
                dfp1: false,
                color_bit_depth: Some(8),
                interface: DigitalVideoInterface::DisplayPort,
            })
        );
        assert_eq!(
            edid.screen_size,
            ScreenSize::Size {
                width_cm: 60,
                height_cm: 34
            }
        );
        assert_eq!(
            edid.dpms,
            DpmsFeatures {
                standby: false,
                suspend: false,
                off: true
            }
        );
        assert_eq!(edid.display_color_type, DisplayColorType::Undefined);
        assert_eq!(
            edid.color_encoding_formats,
            Some(ColorEncodingFormats {
                rgb444: true,
                ycrcb444: true,
                ycrcb422: true
            })
        );
        assert!(edid.misc_features.has_preferred_timing);
        assert!(edid.misc_features.preferred_timing_is_native);
        assert!(!edid.misc_features.continuous_freq);

        assert!(edid.established_timings.t640x480_60hz);
        assert!(edid.established_timings.t1024x768_60hz);
        assert_eq!(edid.standard_timings.len(), 2);

        assert_eq!(edid.detailed_timing_defs.len(), 1);
        assert_eq!(edid.preferred_timing().map(|t| t.horizontal_active_pixels), Some(1920));
        assert_eq!(edid.display_descriptors.len(), 3);
        assert_eq!(edid.product_name(), Some("DELL U2720Q"));
        assert_eq!(edid.serial_string(), Some("ABC123"));
        assert!(matches!(
            edid.display_descriptors[0],
            DisplayDescriptor::RangeLimits(DisplayRangeLimits {
                limits_type: RangeLimitsType::Bare,
                ..
            })
        ));
        assert!(edid.extensions.is_empty());
    }

    #[test]
    fn test_chromaticity() {
        let edid = parse_block(base_block());
        let coords = edid.chromaticity_coords;

        // 0xEE = 11 10 11 10, red x high byte 0xA3
        assert_eq!(coords.red_x, f32::from((0xA3u16 << 2) | 0b11) / 1024.0);
        // 0x91 = 10 01 00 01
        assert_eq!(coords.blue_x, f32::from((0x26u16 << 2) | 0b10) / 1024.0);
        assert_eq!(coords.white_x, 0.3125);
        assert_eq!(coords.white_y, f32::from((0x54u16 << 2) | 0b01) / 1024.0);
    }

    #[test]
    fn test_unset_chromaticity() {
        let edid = with_base(|block| {
            block[0x19..0x23].fill(0);
            block[0x1B] = 0xA3;
        });
        let report = edid.failure_msg.unwrap();
        assert!(report.contains("Some but not all primaries coordinates are unset."));
        assert!(report.contains("White-point coordinates are unset."));
    }

    #[test]
    fn test_checksum_flip_is_malformed() {
        let mut block = base_block();
        block[0x7F] ^= 0xFF;

        let err = Edid::parse(&block).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_bad_sizes_are_malformed() {
        let block = base_block();
        assert_eq!(
            Edid::parse(&block[..127]).unwrap_err().kind(),
            ErrorKind::Malformed
        );
        assert_eq!(Edid::parse(&[]).unwrap_err().kind(), ErrorKind::Malformed);

        let mut blob = block.to_vec();
        blob.push(0);
        assert_eq!(Edid::parse(&blob).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_bad_header_is_malformed() {
        let mut block = base_block();
        block[0] = 0x01;
        fix_checksum(&mut block);
        assert_eq!(Edid::parse(&block).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_version_2_is_unsupported() {
        let mut block = base_block();
        block[0x12] = 2;
        fix_checksum(&mut block);
        assert_eq!(Edid::parse(&block).unwrap_err().kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_extension_count_mismatch_is_malformed() {
        let mut block = base_block();
        block[0x7E] = 1;
        fix_checksum(&mut block);
        assert_eq!(Edid::parse(&block).unwrap_err().kind(), ErrorKind::Malformed);
    }

    #[test]
    fn test_gamma() {
        let edid = with_base(|block| block[0x17] = 0xFF);
        assert_eq!(edid.gamma, None);

        let edid = with_base(|block| block[0x17] = 0x78);
        assert_eq!(edid.gamma, Some(2.2));
    }

    #[test]
    fn test_model_year() {
        let edid = with_base(|block| {
            block[0x10] = 0xFF;
            block[0x11] = 33;
        });
        assert_eq!(edid.vendor_product.model_year, Some(2023));
        assert_eq!(edid.vendor_product.manufacture_year, None);
        assert_eq!(edid.vendor_product.manufacture_week, None);
    }

    #[test]
    fn test_reserved_year_and_week() {
        let edid = with_base(|block| {
            block[0x10] = 60;
            block[0x11] = 0x05;
        });
        assert_eq!(edid.vendor_product.manufacture_year, None);
        assert_eq!(edid.vendor_product.manufacture_week, None);

        let report = edid.failure_msg.unwrap();
        assert!(report.starts_with("Block 0, Base EDID:\n"));
        assert!(report.contains("  Year set to reserved value.\n"));
        assert!(report.contains("  Invalid week 60 of manufacture.\n"));
    }

    #[test]
    fn test_standard_timing_unused_code_is_skipped() {
        let edid = with_base(|block| block[0x26..0x36].fill(0x01));
        assert!(edid.standard_timings.is_empty());
        assert_eq!(edid.failure_msg, None);
    }

    #[test]
    fn test_analog_input_1_3() {
        let edid = with_base(|block| {
            block[0x13] = 3;
            block[0x14] = 0b0000_1110;
            // Bare limits are 1.4 only
            block[0x48..0x5A].copy_from_slice(&DUMMY_DESCRIPTOR);
        });

        assert_eq!(
            edid.video_input,
            VideoInput::Analog(AnalogVideoInput {
                signal_level_std: SignalLevelStandard::L0_700_0_300,
                video_setup: false,
                sync_separate: true,
                sync_composite: true,
                sync_on_green: true,
                sync_serrations: false,
            })
        );
        // Not digital 1.4, so bits 4:3 are the display color type
        assert_eq!(edid.display_color_type, DisplayColorType::Undefined);
        assert_eq!(edid.color_encoding_formats, None);
        assert!(edid.misc_features.has_preferred_timing);
        assert!(!edid.misc_features.default_gtf);
        assert_eq!(edid.failure_msg, None);
    }

    #[test]
    fn test_digital_input_reserved_bits_1_3() {
        let edid = with_base(|block| {
            block[0x13] = 3;
            block[0x14] = 0x81;
            block[0x48..0x5A].copy_from_slice(&DUMMY_DESCRIPTOR);
        });
        assert_eq!(
            edid.video_input,
            VideoInput::Digital(DigitalVideoInput {
                dfp1: true,
                color_bit_depth: None,
                interface: DigitalVideoInterface::Undefined,
            })
        );
        assert_eq!(edid.failure_msg, None);

        let edid = with_base(|block| {
            block[0x13] = 3;
            block[0x14] = 0x85;
            block[0x48..0x5A].copy_from_slice(&DUMMY_DESCRIPTOR);
        });
        assert!(edid
            .failure_msg
            .unwrap()
            .contains("Digital Video Interface Standard set to reserved value 0x85."));
    }

    #[test]
    fn test_reserved_interface() {
        let edid = with_base(|block| block[0x14] = 0xF9);
        assert_eq!(
            edid.video_input,
            VideoInput::Digital(DigitalVideoInput {
                dfp1: false,
                color_bit_depth: None,
                interface: DigitalVideoInterface::Undefined,
            })
        );
        let report = edid.failure_msg.unwrap();
        assert!(report.contains("Color Bit Depth set to reserved value."));
        assert!(report.contains("Digital Video Interface Standard set to reserved value 0x09."));
    }

    #[test]
    fn test_aspect_ratio_screen_size() {
        let edid = with_base(|block| {
            block[0x15] = 79;
            block[0x16] = 0;
        });
        assert_eq!(edid.screen_size, ScreenSize::LandscapeAspectRatio(1.78));

        let edid = with_base(|block| {
            block[0x15] = 0;
            block[0x16] = 0;
        });
        assert_eq!(edid.screen_size, ScreenSize::Undefined);
    }

    #[test]
    fn test_descriptor_ordering() {
        let edid = with_base(|block| {
            // Swap the detailed timing and the range limits
            let (dtd, range) = block[0x36..0x5A].split_at_mut(18);
            dtd.swap_with_slice(range);
        });

        assert_eq!(edid.detailed_timing_defs.len(), 1);
        assert_eq!(edid.display_descriptors.len(), 3);
        let report = edid.failure_msg.unwrap();
        assert!(report.contains("The first byte descriptor must contain the preferred timing."));
        assert!(report.contains("Invalid detailed timing descriptor ordering."));
    }

    #[test]
    fn test_opaque_and_unknown_extensions() {
        let mut blob = base_block().to_vec();

        let mut vendor = [0u8; BLOCK_SIZE];
        vendor[0] = 0xFF;
        append_extension(&mut blob, vendor);

        let mut unknown = [0u8; BLOCK_SIZE];
        unknown[0] = 0x42;
        append_extension(&mut blob, unknown);

        let edid = Edid::parse(&blob).unwrap();
        assert_eq!(edid.extensions.len(), 1);
        assert_eq!(edid.extensions[0].tag(), ExtensionTag::Vendor);
        assert_eq!(
            edid.failure_msg.as_deref(),
            Some("Block 0, Base EDID:\n  Unknown Extension Block.\n")
        );
    }

    #[test]
    fn test_extension_checksum_is_malformed() {
        let mut blob = base_block().to_vec();
        let mut vendor = [0u8; BLOCK_SIZE];
        vendor[0] = 0xFF;
        append_extension(&mut blob, vendor);
        blob[BLOCK_SIZE + 5] ^= 0x01;

        assert_eq!(Edid::parse(&blob).unwrap_err().kind(), ErrorKind::Malformed);
    }
}
