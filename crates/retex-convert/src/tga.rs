//! 32-bit TGA reading and writing.
//!
//! TGA stores pixels in BGRA byte order, the same order CTXR uses for raw
//! payloads, so this path moves pixel bytes verbatim. Only uncompressed
//! truecolor (type 2) 32-bpp images are handled.

use byteorder::{LittleEndian, WriteBytesExt};
use retex_common::BinaryReader;

use crate::{Error, Result};

/// Size of the TGA file header.
pub const TGA_HEADER_SIZE: usize = 18;

/// Length of the fixed trailer some export paths append.
pub const TGA_FOOTER_LEN: usize = 32;

/// Uncompressed truecolor image type.
const TGA_TYPE_TRUECOLOR: u8 = 2;

/// Descriptor: top-left origin, 8 alpha bits.
const TGA_DESCRIPTOR: u8 = 0x28;

/// Parsed view of a TGA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TgaInfo {
    pub width: u16,
    pub height: u16,
}

/// Write a 32-bit TGA from a BGRA payload.
///
/// With `with_footer`, a fixed 32-byte trailer is appended: all zeros except
/// a final 0x01 byte.
pub fn write_tga(width: u16, height: u16, bgra: &[u8], with_footer: bool) -> Result<Vec<u8>> {
    let expected = usize::from(width) * usize::from(height) * 4;
    if bgra.len() != expected {
        return Err(Error::PayloadSizeMismatch {
            expected,
            actual: bgra.len(),
        });
    }

    let mut out = Vec::with_capacity(TGA_HEADER_SIZE + bgra.len());
    out.push(0); // id length
    out.push(0); // no color map
    out.push(TGA_TYPE_TRUECOLOR);
    out.extend_from_slice(&[0; 5]); // color map spec
    out.extend_from_slice(&[0; 4]); // x/y origin
    out.write_u16::<LittleEndian>(width)?;
    out.write_u16::<LittleEndian>(height)?;
    out.push(32); // bits per pixel
    out.push(TGA_DESCRIPTOR);
    out.extend_from_slice(bgra);

    if with_footer {
        out.extend_from_slice(&[0; TGA_FOOTER_LEN - 1]);
        out.push(0x01);
    }
    Ok(out)
}

/// Parse a 32-bit TGA, returning its dimensions and BGRA payload.
pub fn parse_tga(data: &[u8]) -> Result<(TgaInfo, &[u8])> {
    let mut reader = BinaryReader::new(data);

    let id_length = reader.read_u8()?;
    let color_map_type = reader.read_u8()?;
    let image_type = reader.read_u8()?;
    if image_type != TGA_TYPE_TRUECOLOR || color_map_type != 0 {
        return Err(Error::UnsupportedFormat(format!(
            "TGA image type {image_type} (only uncompressed truecolor is handled)"
        )));
    }

    reader.advance(5 + 4); // color map spec, origin
    let width = reader.read_u16_le()?;
    let height = reader.read_u16_le()?;
    let bpp = reader.read_u8()?;
    if bpp != 32 {
        return Err(Error::UnsupportedFormat(format!("{bpp}-bpp TGA")));
    }
    reader.advance(1); // descriptor
    reader.advance(usize::from(id_length));

    let pixel_len = usize::from(width) * usize::from(height) * 4;
    let pixels = reader.read_bytes(pixel_len)?;
    Ok((TgaInfo { width, height }, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let bgra: Vec<u8> = (0..4 * 2 * 4).map(|i| i as u8).collect();
        let tga = write_tga(4, 2, &bgra, false).unwrap();
        assert_eq!(tga.len(), TGA_HEADER_SIZE + bgra.len());

        let (info, pixels) = parse_tga(&tga).unwrap();
        assert_eq!(info, TgaInfo { width: 4, height: 2 });
        assert_eq!(pixels, &bgra[..]);
    }

    #[test]
    fn test_footer() {
        let bgra = vec![0u8; 4];
        let tga = write_tga(1, 1, &bgra, true).unwrap();
        assert_eq!(tga.len(), TGA_HEADER_SIZE + 4 + TGA_FOOTER_LEN);
        assert_eq!(tga[tga.len() - 1], 0x01);
        assert!(tga[tga.len() - TGA_FOOTER_LEN..tga.len() - 1]
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_wrong_bpp() {
        let bgra = vec![0u8; 4];
        let mut tga = write_tga(1, 1, &bgra, false).unwrap();
        tga[16] = 24;
        assert!(matches!(
            parse_tga(&tga),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_size_mismatch() {
        assert!(matches!(
            write_tga(2, 2, &[0u8; 4], false),
            Err(Error::PayloadSizeMismatch { expected: 16, actual: 4 })
        ));
    }
}
