//! Fixtures shared by the decoder tests.

use crate::BLOCK_SIZE;

/// Sets the last byte of a 128 byte block so the block sums to zero.
pub fn fix_checksum(block: &mut [u8]) {
    let sum = block[..BLOCK_SIZE - 1]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    block[BLOCK_SIZE - 1] = 0u8.wrapping_sub(sum);
}

/// A conformant EDID 1.4 base block for a digital DisplayPort display, with
/// no extensions. Decodes without a single failure.
pub fn base_block() -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];

    block[0x00..0x08].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    // "DEL", product 0x4123, serial 0x12345678
    block[0x08..0x10].copy_from_slice(&[0x10, 0xAC, 0x23, 0x41, 0x78, 0x56, 0x34, 0x12]);
    // Week 12 of 2020
    block[0x10] = 12;
    block[0x11] = 30;
    block[0x12] = 1;
    block[0x13] = 4;

    // Digital, 8 bits per color, DisplayPort
    block[0x14] = 0xA5;
    block[0x15] = 60;
    block[0x16] = 34;
    block[0x17] = 0x78;
    // Active off, YCrCb 4:4:4 and 4:2:2, preferred timing is native
    block[0x18] = 0x3A;

    block[0x19..0x23].copy_from_slice(&[0xEE, 0x91, 0xA3, 0x54, 0x4C, 0x99, 0x26, 0x0F, 0x50, 0x54]);

    // 640x480@60, 800x600@60, 1024x768@60
    block[0x23..0x26].copy_from_slice(&[0x21, 0x08, 0x00]);

    // 1280x1024@60, 1920x1080@60, the rest unused
    block[0x26..0x36].copy_from_slice(&[
        0x81, 0x80, 0xD1, 0xC0, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01,
        0x01, 0x01,
    ]);

    // 1920x1080@60
    block[0x36..0x48].copy_from_slice(&[
        0x02, 0x3A, 0x80, 0x18, 0x71, 0x38, 0x2D, 0x40, 0x58, 0x2C, 0x45, 0x00, 0x0F, 0x28,
        0x21, 0x00, 0x00, 0x1E,
    ]);

    // Bare range limits, 56-76 Hz, 30-83 kHz, 170 MHz
    block[0x48..0x5A].copy_from_slice(&[
        0x00, 0x00, 0x00, 0xFD, 0x00, 0x38, 0x4C, 0x1E, 0x53, 0x11, 0x01, 0x0A, 0x20, 0x20,
        0x20, 0x20, 0x20, 0x20,
    ]);

    block[0x5A..0x6C].copy_from_slice(&[
        0x00, 0x00, 0x00, 0xFC, 0x00, b'D', b'E', b'L', b'L', b' ', b'U', b'2', b'7', b'2',
        b'0', b'Q', b'\n', b' ',
    ]);

    block[0x6C..0x7E].copy_from_slice(&[
        0x00, 0x00, 0x00, 0xFF, 0x00, b'A', b'B', b'C', b'1', b'2', b'3', b'\n', b' ', b' ',
        b' ', b' ', b' ', b' ',
    ]);

    block[0x7E] = 0;
    fix_checksum(&mut block);
    block
}

/// Appends an extension block to a blob, bumping the extension count and
/// fixing up both checksums.
pub fn append_extension(blob: &mut Vec<u8>, mut extension: [u8; BLOCK_SIZE]) {
    fix_checksum(&mut extension);
    blob.extend_from_slice(&extension);
    blob[0x7E] += 1;
    fix_checksum(&mut blob[..BLOCK_SIZE]);
}
