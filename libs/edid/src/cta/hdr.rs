use serde::Serialize;

use crate::{bits::has_bit, logger::FailureLogger};

/// Decodes a max luminance code value, in cd/m². Zero means unset.
pub fn parse_max_luminance(raw: u8) -> Option<f32> {
    if raw == 0 {
        return None;
    }
    Some(50.0 * 2f32.powf(f32::from(raw) / 32.0))
}

/// Decodes a min luminance code value relative to the max luminance, in
/// cd/m². Zero means unset.
pub fn parse_min_luminance(raw: u8, max: f32) -> Option<f32> {
    if raw == 0 {
        return None;
    }
    let ratio = f32::from(raw) / 255.0;
    Some(max * ratio * ratio / 100.0)
}

/// Inverse of [`parse_max_luminance`], rounded to the nearest code value.
pub fn encode_max_luminance(max: f32) -> u8 {
    if max <= 0.0 {
        return 0;
    }
    // Float to int casts saturate
    ((max / 50.0).log2() * 32.0).round() as u8
}

/// Inverse of [`parse_min_luminance`], rounded to the nearest code value.
pub fn encode_min_luminance(min: f32, max: f32) -> u8 {
    if min <= 0.0 || max <= 0.0 {
        return 0;
    }
    (255.0 * (min / max * 100.0).sqrt()).round() as u8
}

/// Supported electro-optical transfer functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HdrEotfs {
    pub traditional_sdr: bool,
    pub traditional_hdr: bool,
    /// SMPTE ST 2084
    pub pq: bool,
    /// Hybrid log-gamma
    pub hlg: bool,
}

/// Supported static metadata descriptor types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HdrStaticMetadataDescriptors {
    pub type1: bool,
}

/// HDR Static Metadata Data Block (extended tag 6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HdrStaticMetadata {
    pub eotfs: HdrEotfs,
    pub descriptors: HdrStaticMetadataDescriptors,
    /// cd/m²
    pub desired_content_max_luminance: Option<f32>,
    /// cd/m²
    pub desired_content_max_frame_avg_luminance: Option<f32>,
    /// cd/m²
    pub desired_content_min_luminance: Option<f32>,
}

impl HdrStaticMetadata {
    pub(crate) fn parse(data: &[u8], logger: &mut FailureLogger) -> Option<Self> {
        if data.len() < 2 {
            logger.add_failure(format!(
                "HDR Static Metadata Data Block: Empty Data Block with length {}.",
                data.len()
            ));
            return None;
        }

        let eotfs = HdrEotfs {
            traditional_sdr: has_bit(data[0], 0),
            traditional_hdr: has_bit(data[0], 1),
            pq: has_bit(data[0], 2),
            hlg: has_bit(data[0], 3),
        };
        let descriptors = HdrStaticMetadataDescriptors {
            type1: has_bit(data[1], 0),
        };

        let desired_content_max_luminance = data.get(2).copied().and_then(parse_max_luminance);
        let desired_content_max_frame_avg_luminance =
            data.get(3).copied().and_then(parse_max_luminance);

        // The min luminance is relative to the max luminance
        let desired_content_min_luminance = match (data.get(4).copied(), desired_content_max_luminance) {
            (None | Some(0), _) => None,
            (Some(raw), Some(max)) => parse_min_luminance(raw, max),
            (Some(_), None) => {
                logger.add_failure(
                    "HDR Static Metadata Data Block: Desired content min luminance is set, \
                     but max luminance is unset.",
                );
                None
            }
        };

        Some(HdrStaticMetadata {
            eotfs,
            descriptors,
            desired_content_max_luminance,
            desired_content_max_frame_avg_luminance,
            desired_content_min_luminance,
        })
    }
}
