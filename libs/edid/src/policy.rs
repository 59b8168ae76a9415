//! Revision-gated conformance rules.
//!
//! The EDID and CTA-861 documents have redefined, reserved and un-reserved
//! fields over the years, so the same byte can be a violation in one
//! revision and perfectly fine in the next. Every such rule the decoders
//! enforce is listed in [`Rule`], and [`severity`] is the one place that
//! says what happens for a given revision.
//!
//! Which revision number applies depends on the rule's family: EDID rules
//! take the base block revision, CTA rules take the CTA extension revision,
//! DisplayID rules ignore it.

/// What a decoder must do when a rule is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Accept silently.
    Ignore,
    /// Log a failure and keep the decoded value.
    Soft,
    /// Log a failure and discard the enclosing record.
    Reject,
    /// Discard the enclosing record without logging.
    Skip,
}

impl Severity {
    pub fn is_logged(self) -> bool {
        matches!(self, Severity::Soft | Severity::Reject)
    }

    pub fn discards(self) -> bool {
        matches!(self, Severity::Reject | Severity::Skip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    // EDID base block, gated on the EDID revision
    ReservedManufactureYear,
    InvalidManufactureWeek,
    DigitalInputReservedBits,
    ReservedColorBitDepth,
    ReservedDigitalInterface,
    InvalidStandardTimingCode,
    PreferredTimingMissing,
    UnknownDisplayDescriptor,
    UnknownExtensionBlock,

    // Display range limits descriptor
    ReservedRangeOffsetFlags,
    RangeOffsetReservedBits,
    RangeOffsetBeforeV14,
    ReservedRangeLimits,
    InvertedRangeLimits,
    MissingMaxPixelClock,
    BareLimitsBeforeV14,
    CvtBeforeV14,
    UnknownRangeClass,
    GtfWithoutContinuousFrequency,
    CvtWithoutContinuousFrequency,
    CvtReservedBits,
    InvalidCvtAspectRatio,
    MissingCvtPreferredRefresh,

    // Other display descriptors
    StandardTimingsTerminator,
    EstablishedTimingsIIIBeforeV14,
    EstablishedTimingsIIIReservedBits,
    ColorManagementVersion,

    // CTA-861 extension, gated on the CTA revision
    CtaFlagsBeforeRevision2,
    UnknownCtaDataBlock,
    ReservedVic,
    RgbQuantizationNotSelectable,

    // DisplayID, not revision dependent
    UnknownDisplayIdDataBlock,
    DisplayIdDataBlockRevision,
}

/// The conformance policy table.
pub fn severity(rule: Rule, revision: u8) -> Severity {
    use Rule::*;

    match rule {
        ReservedManufactureYear | RangeOffsetReservedBits | MissingMaxPixelClock => {
            soft_if(revision == 4)
        }

        InvalidManufactureWeek
        | ReservedColorBitDepth
        | ReservedDigitalInterface
        | InvalidStandardTimingCode
        | UnknownDisplayDescriptor
        | UnknownExtensionBlock
        | CvtReservedBits
        | StandardTimingsTerminator
        | EstablishedTimingsIIIReservedBits
        | ColorManagementVersion => soft_if(revision <= 4),

        DigitalInputReservedBits | RangeOffsetBeforeV14 | EstablishedTimingsIIIBeforeV14 => {
            soft_if(revision < 4)
        }

        PreferredTimingMissing => soft_if((3..=4).contains(&revision)),

        // The record can't be decoded at all, only the log entry is gated
        ReservedRangeOffsetFlags | InvalidCvtAspectRatio | MissingCvtPreferredRefresh => {
            if revision <= 4 {
                Severity::Reject
            } else {
                Severity::Skip
            }
        }

        ReservedRangeLimits | UnknownRangeClass => reject_if(revision <= 4),
        BareLimitsBeforeV14 | CvtBeforeV14 => reject_if(revision < 4),
        GtfWithoutContinuousFrequency | CvtWithoutContinuousFrequency => reject_if(revision >= 4),
        InvertedRangeLimits => Severity::Reject,

        CtaFlagsBeforeRevision2 => soft_if(revision < 2),
        UnknownCtaDataBlock => soft_if(revision <= 3),
        ReservedVic => {
            if revision <= 3 {
                Severity::Reject
            } else {
                Severity::Skip
            }
        }
        RgbQuantizationNotSelectable => soft_if(revision >= 3),

        UnknownDisplayIdDataBlock | DisplayIdDataBlockRevision => Severity::Soft,
    }
}

fn soft_if(condition: bool) -> Severity {
    if condition {
        Severity::Soft
    } else {
        Severity::Ignore
    }
}

fn reject_if(condition: bool) -> Severity {
    if condition {
        Severity::Reject
    } else {
        Severity::Ignore
    }
}
