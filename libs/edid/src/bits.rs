//! Bit helpers shared by every decoder.
//!
//! Bit indices are zero-based from the least significant bit, and ranges
//! are inclusive on both ends, matching the way the VESA and CTA documents
//! describe their bit fields (e.g. "bits 6:4").

/// Returns true if bit `index` of `byte` is set.
pub fn has_bit(byte: u8, index: u8) -> bool {
    assert!(index <= 7, "bit index {} out of range", index);
    byte & (1 << index) != 0
}

/// Extracts the inclusive bit span `high..=low` of `byte`, right-aligned.
///
/// ```text
///  byte = 0b1011_0110, high = 6, low = 4
///            ^^^
///  result = 0b011
/// ```
///
/// Panics if `low > high` or `high > 7`. That is a programming error in the
/// decoder, never something the input data can trigger.
pub fn get_bit_range(byte: u8, high: u8, low: u8) -> u8 {
    assert!(
        high <= 7 && high >= low,
        "invalid bit range {}:{}",
        high,
        low
    );

    (byte >> low) & range_mask(high, low)
}

/// Places `value` into the inclusive bit span `high..=low`, discarding any
/// bits of `value` that don't fit. All other bits of the result are zero.
///
/// This is the inverse of [`get_bit_range`].
pub fn set_bit_range(value: u8, high: u8, low: u8) -> u8 {
    assert!(
        high <= 7 && high >= low,
        "invalid bit range {}:{}",
        high,
        low
    );

    (value & range_mask(high, low)) << low
}

fn range_mask(high: u8, low: u8) -> u8 {
    let width = high - low + 1;
    // A full byte would overflow the shift below
    if width == 8 {
        0xFF
    } else {
        (1u8 << width) - 1
    }
}

/// Joins a little-endian byte pair.
pub(crate) fn le16(lo: u8, hi: u8) -> u16 {
    u16::from(lo) | (u16::from(hi) << 8)
}

/// True if the bytes sum to zero, modulo 256. Both EDID blocks and DisplayID
/// sections carry a checksum byte chosen to make this hold.
pub(crate) fn checksum_ok(data: &[u8]) -> bool {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)) == 0
}
