//! EDID, CTA-861 and DisplayID decoder.
//!
//! Decoding is best effort: structural problems fail with an [`EdidError`],
//! while conformance problems are collected into a text report on the
//! returned [`Edid`] and decoding carries on.

pub mod bits;
pub mod cta;
pub mod descriptors;
pub mod displayid;
pub mod dmt;
pub mod edid;
pub mod error;
pub mod gtf;
pub mod policy;

mod logger;

#[cfg(test)]
mod test_util;

pub use edid::{Edid, ExtensionBlock, ExtensionTag};
pub use error::{EdidError, ErrorKind};

/// Size of the base block and of every extension block.
pub const BLOCK_SIZE: usize = 128;

/// Maximum number of blocks in a blob, base block included.
pub const MAX_BLOCK_COUNT: usize = 256;

/// Decodes an EDID blob. Shorthand for [`Edid::parse`].
pub fn parse(data: &[u8]) -> Result<Edid, EdidError> {
    Edid::parse(data)
}
