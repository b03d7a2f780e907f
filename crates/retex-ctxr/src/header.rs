//! CTXR header handling.
//!
//! The CTXR header is a fixed 132-byte block. Only four fields are
//! understood; everything else is opaque vendor data that must survive a
//! parse/serialize round trip byte-exact, so the header is stored as the raw
//! bytes and the known fields are decoded on access.

use crate::{Error, Result};

/// The fixed size of a CTXR header in bytes.
pub const CTXR_HEADER_SIZE: usize = 132;

const WIDTH_OFFSET: usize = 8;
const HEIGHT_OFFSET: usize = 10;
const MIPMAP_COUNT_OFFSET: usize = 0x26;
const PIXEL_DATA_LENGTH_OFFSET: usize = 0x80;

/// The 132-byte CTXR file header.
///
/// All multi-byte fields are big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtxrHeader {
    bytes: [u8; CTXR_HEADER_SIZE],
}

impl CtxrHeader {
    /// Parse a header from the start of `data`.
    ///
    /// Fails with [`Error::TruncatedHeader`] if fewer than 132 bytes are
    /// available.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CTXR_HEADER_SIZE {
            return Err(Error::TruncatedHeader {
                expected: CTXR_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut bytes = [0u8; CTXR_HEADER_SIZE];
        bytes.copy_from_slice(&data[..CTXR_HEADER_SIZE]);
        Ok(Self { bytes })
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u16 {
        u16::from_be_bytes([self.bytes[WIDTH_OFFSET], self.bytes[WIDTH_OFFSET + 1]])
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u16 {
        u16::from_be_bytes([self.bytes[HEIGHT_OFFSET], self.bytes[HEIGHT_OFFSET + 1]])
    }

    /// Number of mip levels, including the base level.
    pub fn mipmap_count(&self) -> u8 {
        self.bytes[MIPMAP_COUNT_OFFSET]
    }

    /// Length in bytes of the main pixel payload that follows the header.
    pub fn pixel_data_length(&self) -> u32 {
        u32::from_be_bytes([
            self.bytes[PIXEL_DATA_LENGTH_OFFSET],
            self.bytes[PIXEL_DATA_LENGTH_OFFSET + 1],
            self.bytes[PIXEL_DATA_LENGTH_OFFSET + 2],
            self.bytes[PIXEL_DATA_LENGTH_OFFSET + 3],
        ])
    }

    /// Get the raw header bytes.
    pub fn as_bytes(&self) -> &[u8; CTXR_HEADER_SIZE] {
        &self.bytes
    }

    /// Return a copy with exactly the four known fields overwritten.
    ///
    /// Every other byte is carried over unchanged, which is what makes a
    /// captured header usable as a template for writing replacement assets.
    pub fn with_updated(
        &self,
        width: u16,
        height: u16,
        mipmap_count: u8,
        pixel_data_length: u32,
    ) -> Self {
        let mut bytes = self.bytes;
        bytes[WIDTH_OFFSET..WIDTH_OFFSET + 2].copy_from_slice(&width.to_be_bytes());
        bytes[HEIGHT_OFFSET..HEIGHT_OFFSET + 2].copy_from_slice(&height.to_be_bytes());
        bytes[MIPMAP_COUNT_OFFSET] = mipmap_count;
        bytes[PIXEL_DATA_LENGTH_OFFSET..PIXEL_DATA_LENGTH_OFFSET + 4]
            .copy_from_slice(&pixel_data_length.to_be_bytes());
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> [u8; CTXR_HEADER_SIZE] {
        let mut bytes = [0xABu8; CTXR_HEADER_SIZE];
        bytes[WIDTH_OFFSET..WIDTH_OFFSET + 2].copy_from_slice(&512u16.to_be_bytes());
        bytes[HEIGHT_OFFSET..HEIGHT_OFFSET + 2].copy_from_slice(&256u16.to_be_bytes());
        bytes[MIPMAP_COUNT_OFFSET] = 5;
        bytes[PIXEL_DATA_LENGTH_OFFSET..PIXEL_DATA_LENGTH_OFFSET + 4]
            .copy_from_slice(&(512u32 * 256 * 4).to_be_bytes());
        bytes
    }

    #[test]
    fn test_parse_fields() {
        let header = CtxrHeader::parse(&sample_header()).unwrap();
        assert_eq!(header.width(), 512);
        assert_eq!(header.height(), 256);
        assert_eq!(header.mipmap_count(), 5);
        assert_eq!(header.pixel_data_length(), 512 * 256 * 4);
    }

    #[test]
    fn test_truncated() {
        let err = CtxrHeader::parse(&[0u8; 131]).unwrap_err();
        assert!(matches!(err, Error::TruncatedHeader { actual: 131, .. }));
    }

    #[test]
    fn test_with_updated_preserves_opaque_bytes() {
        let header = CtxrHeader::parse(&sample_header()).unwrap();
        let updated = header.with_updated(64, 32, 2, 64 * 32 * 4);

        assert_eq!(updated.width(), 64);
        assert_eq!(updated.height(), 32);
        assert_eq!(updated.mipmap_count(), 2);
        assert_eq!(updated.pixel_data_length(), 64 * 32 * 4);

        // Every byte outside the four fields is untouched.
        for (i, (a, b)) in header
            .as_bytes()
            .iter()
            .zip(updated.as_bytes().iter())
            .enumerate()
        {
            let in_field = (WIDTH_OFFSET..HEIGHT_OFFSET + 2).contains(&i)
                || i == MIPMAP_COUNT_OFFSET
                || (PIXEL_DATA_LENGTH_OFFSET..PIXEL_DATA_LENGTH_OFFSET + 4).contains(&i);
            if !in_field {
                assert_eq!(a, b, "opaque byte {i} changed");
            }
        }
    }
}
