use bitflags::bitflags;
use serde::Serialize;

use crate::{
    bits::{get_bit_range, has_bit, le16},
    edid::MiscFeatures,
    logger::FailureLogger,
    policy::{Rule, Severity},
};

/// Secondary GTF curve parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondaryGtf {
    /// Horizontal frequency above which the secondary curve applies, in Hz
    pub start_freq_hz: i32,
    pub c: f32,
    pub m: f32,
    pub k: f32,
    pub j: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CvtAspectRatio {
    Ar4_3,
    Ar16_9,
    Ar16_10,
    Ar5_4,
    Ar15_9,
}

bitflags! {
    /// Byte 14 of a CVT range limits descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct CvtSupportedAspectRatios: u8 {
        const AR_4_3 = 1 << 7;
        const AR_16_9 = 1 << 6;
        const AR_16_10 = 1 << 5;
        const AR_5_4 = 1 << 4;
        const AR_15_9 = 1 << 3;
    }
}

bitflags! {
    /// Byte 16 of a CVT range limits descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct CvtScaling: u8 {
        const HORIZONTAL_SHRINK = 1 << 7;
        const HORIZONTAL_STRETCH = 1 << 6;
        const VERTICAL_SHRINK = 1 << 5;
        const VERTICAL_STRETCH = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CvtSupport {
    pub version: u8,
    pub revision: u8,
    /// Maximum active pixels per line, zero if unlimited
    pub max_horiz_px: i32,
    pub supported_aspect_ratios: CvtSupportedAspectRatios,
    pub preferred_aspect_ratio: CvtAspectRatio,
    pub standard_blanking: bool,
    pub reduced_blanking: bool,
    pub supported_scaling: CvtScaling,
    pub preferred_vert_refresh_hz: i32,
}

/// Timing formula support advertised alongside the limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RangeLimitsType {
    /// Range limits only, no additional timing information
    Bare,
    DefaultGtf,
    SecondaryGtf(SecondaryGtf),
    Cvt(CvtSupport),
}

/// Display range limits descriptor (tag 0xFD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRangeLimits {
    pub min_vert_rate_hz: i32,
    pub max_vert_rate_hz: i32,
    pub min_horiz_rate_hz: i32,
    pub max_horiz_rate_hz: i32,
    /// Zero if unset. Rounded to 10 MHz, refined by CVT descriptors.
    pub max_pixel_clock_hz: i32,
    pub limits_type: RangeLimitsType,
}

const PREFIX: &str = "Display Range Limits";

/// Returns the (max, min) offsets for one pair of offset flag bits.
fn decode_offset(
    flags: u8,
    revision: u8,
    logger: &mut FailureLogger,
) -> Option<(i32, i32)> {
    match flags {
        0b00 => Some((0, 0)),
        0b10 => Some((255, 0)),
        0b11 => Some((255, 255)),
        _ => {
            logger.check(Rule::ReservedRangeOffsetFlags, revision, || {
                format!("Range offset flags set to reserved value 0x{:02x}.", flags)
            });
            None
        }
    }
}

impl DisplayRangeLimits {
    /// Decodes a range limits descriptor. `None` means the descriptor is
    /// unusable and must be dropped; the reason has been logged where the
    /// policy asks for it.
    pub(crate) fn parse(
        data: &[u8; 18],
        revision: u8,
        misc: &MiscFeatures,
        logger: &mut FailureLogger,
    ) -> Option<Self> {
        let mut vert_offset = (0, 0);
        let mut horiz_offset = (0, 0);

        let offset_flags = data[4];
        if revision >= 4 {
            vert_offset = decode_offset(get_bit_range(offset_flags, 1, 0), revision, logger)?;
            horiz_offset = decode_offset(get_bit_range(offset_flags, 3, 2), revision, logger)?;

            if get_bit_range(offset_flags, 7, 4) != 0 {
                logger.check(Rule::RangeOffsetReservedBits, revision, || {
                    format!("{PREFIX}: Bits 7:4 of the range offset flags are reserved.")
                });
            }
        } else if offset_flags != 0 {
            logger.check(Rule::RangeOffsetBeforeV14, revision, || {
                format!("{PREFIX}: Range offset flags are unsupported in EDID 1.3.")
            });
        }

        if data[5..=8].contains(&0) {
            let severity = logger.check(Rule::ReservedRangeLimits, revision, || {
                format!("{PREFIX}: Range limits set to reserved values.")
            });
            if severity.discards() {
                return None;
            }
        }

        let min_vert_rate_hz = i32::from(data[5]) + vert_offset.1;
        let max_vert_rate_hz = i32::from(data[6]) + vert_offset.0;
        let min_horiz_rate_hz = (i32::from(data[7]) + horiz_offset.1) * 1000;
        let max_horiz_rate_hz = (i32::from(data[8]) + horiz_offset.0) * 1000;

        if min_vert_rate_hz > max_vert_rate_hz {
            logger.check(Rule::InvertedRangeLimits, revision, || {
                format!("{PREFIX}: Min vertical rate > max vertical rate.")
            });
            return None;
        }
        if min_horiz_rate_hz > max_horiz_rate_hz {
            logger.check(Rule::InvertedRangeLimits, revision, || {
                format!("{PREFIX}: Min horizontal freq > max horizontal freq.")
            });
            return None;
        }

        let mut max_pixel_clock_hz = i32::from(data[9]) * 10_000_000;
        if max_pixel_clock_hz == 0 {
            logger.check(Rule::MissingMaxPixelClock, revision, || {
                format!("{PREFIX}: EDID 1.4 block does not set max dotclock.")
            });
        }

        #[derive(PartialEq)]
        enum Class {
            Bare,
            DefaultGtf,
            SecondaryGtf,
            Cvt,
        }

        let support_flags = data[10];
        let class = match support_flags {
            // Always default GTF since 1.4, a misc feature bit before that
            0x00 if revision >= 4 || misc.default_gtf => Class::DefaultGtf,
            0x00 => Class::Bare,
            0x01 => {
                let severity = logger.check(Rule::BareLimitsBeforeV14, revision, || {
                    format!("{PREFIX}: 'Bare Limits' is not allowed for EDID < 1.4.")
                });
                if severity.discards() {
                    return None;
                }
                Class::Bare
            }
            0x02 => Class::SecondaryGtf,
            0x04 => {
                let severity = logger.check(Rule::CvtBeforeV14, revision, || {
                    format!("{PREFIX}: 'CVT' is not allowed for EDID < 1.4.")
                });
                if severity.discards() {
                    return None;
                }
                Class::Cvt
            }
            _ => {
                let severity = logger.check(Rule::UnknownRangeClass, revision, || {
                    format!("{PREFIX}: Unknown range class (0x{:02x}).", support_flags)
                });
                if severity.discards() {
                    return None;
                }
                Class::Bare
            }
        };

        // The continuous frequency flag only exists since 1.4
        if !misc.continuous_freq {
            let severity = match class {
                Class::DefaultGtf | Class::SecondaryGtf => {
                    logger.check(Rule::GtfWithoutContinuousFrequency, revision, || {
                        format!("{PREFIX}: GTF can't be combined with non-continuous frequencies.")
                    })
                }
                Class::Cvt => logger.check(Rule::CvtWithoutContinuousFrequency, revision, || {
                    format!("{PREFIX}: CVT can't be combined with non-continuous frequencies.")
                }),
                Class::Bare => Severity::Ignore,
            };
            if severity.discards() {
                return None;
            }
        }

        let limits_type = match class {
            Class::SecondaryGtf => {
                if data[11] != 0 {
                    logger.add_failure(format!(
                        "{PREFIX}: Byte 11 is 0x{:02x} instead of 0x00.",
                        data[11]
                    ));
                }
                RangeLimitsType::SecondaryGtf(SecondaryGtf {
                    start_freq_hz: i32::from(data[12]) * 2000,
                    c: f32::from(data[13]) / 2.0,
                    m: f32::from(le16(data[14], data[15])),
                    k: f32::from(data[16]),
                    j: f32::from(data[17]) / 2.0,
                })
            }
            Class::Cvt => {
                max_pixel_clock_hz -= i32::from(get_bit_range(data[12], 7, 2)) * 250_000;
                let cvt = parse_cvt(data, revision, logger)?;
                RangeLimitsType::Cvt(cvt)
            }
            Class::Bare | Class::DefaultGtf => {
                if data[11] != 0x0A {
                    logger.add_failure(format!(
                        "{PREFIX}: Byte 11 is 0x{:02x} instead of 0x0a.",
                        data[11]
                    ));
                }
                if data[12..].iter().any(|b| *b != 0x20) {
                    logger.add_failure(format!("{PREFIX}: Bytes 12-17 must be 0x20."));
                }
                if class == Class::Bare {
                    RangeLimitsType::Bare
                } else {
                    RangeLimitsType::DefaultGtf
                }
            }
        };

        Some(DisplayRangeLimits {
            min_vert_rate_hz,
            max_vert_rate_hz,
            min_horiz_rate_hz,
            max_horiz_rate_hz,
            max_pixel_clock_hz,
            limits_type,
        })
    }
}

fn parse_cvt(data: &[u8; 18], revision: u8, logger: &mut FailureLogger) -> Option<CvtSupport> {
    if get_bit_range(data[14], 2, 0) != 0 {
        logger.check(Rule::CvtReservedBits, revision, || {
            format!("{PREFIX}: Reserved bits of byte 14 are non-zero.")
        });
    }

    let raw_aspect = get_bit_range(data[15], 7, 5);
    let preferred_aspect_ratio = match raw_aspect {
        0 => CvtAspectRatio::Ar4_3,
        1 => CvtAspectRatio::Ar16_9,
        2 => CvtAspectRatio::Ar16_10,
        3 => CvtAspectRatio::Ar5_4,
        4 => CvtAspectRatio::Ar15_9,
        _ => {
            logger.check(Rule::InvalidCvtAspectRatio, revision, || {
                format!(
                    "{PREFIX}: Invalid preferred aspect ratio 0x{:02x}.",
                    raw_aspect
                )
            });
            return None;
        }
    };

    if get_bit_range(data[15], 2, 0) != 0 {
        logger.check(Rule::CvtReservedBits, revision, || {
            format!("{PREFIX}: Reserved bits of byte 15 are non-zero.")
        });
    }
    if get_bit_range(data[16], 3, 0) != 0 {
        logger.check(Rule::CvtReservedBits, revision, || {
            format!("{PREFIX}: Reserved bits of byte 16 are non-zero.")
        });
    }

    let preferred_vert_refresh_hz = i32::from(data[17]);
    if preferred_vert_refresh_hz == 0 {
        logger.check(Rule::MissingCvtPreferredRefresh, revision, || {
            format!("{PREFIX}: Preferred vertical refresh rate must be specified.")
        });
        return None;
    }

    Some(CvtSupport {
        version: get_bit_range(data[11], 7, 4),
        revision: get_bit_range(data[11], 3, 0),
        max_horiz_px: 8 * ((i32::from(get_bit_range(data[12], 1, 0)) << 8) | i32::from(data[13])),
        supported_aspect_ratios: CvtSupportedAspectRatios::from_bits_truncate(data[14]),
        preferred_aspect_ratio,
        standard_blanking: has_bit(data[15], 3),
        reduced_blanking: has_bit(data[15], 4),
        supported_scaling: CvtScaling::from_bits_truncate(data[16]),
        preferred_vert_refresh_hz,
    })
}
