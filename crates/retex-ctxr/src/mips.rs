//! Mip-level chain parsing and serialization.
//!
//! CTXR stores the mip levels after the main payload with undeclared
//! inter-level padding, sometimes preceded by a 4-byte big-endian size
//! field, and never with an explicit layout. Recovery is heuristic: scan for
//! the level's start byte by byte and test whether a plausible size field is
//! present. The scan windows and tolerance are format constants; changing
//! them silently corrupts files that parse today.

use byteorder::{BigEndian, WriteBytesExt};
use retex_common::BinaryReader;
use tracing::debug;

use crate::layout::PixelLayout;
use crate::{Error, Result};

/// Maximum number of zero bytes accepted as inter-level padding (raw chains).
pub const MAX_PADDING_SCAN: usize = 64;

/// How far ahead the DXT5 branch looks for the first nonzero byte.
pub const DXT5_SCAN_WINDOW: usize = MAX_PADDING_SCAN + 32;

/// DXT5 level starts are snapped down to this granularity so leading zero
/// bytes belonging to a genuine first block are not consumed as padding.
pub const DXT5_BLOCK_ALIGN: usize = 16;

/// A declared size field is trusted only within this fraction of the
/// computed size.
pub const SIZE_TOLERANCE: f64 = 0.10;

/// Fixed trailer length after the last mip level.
pub const FINAL_PADDING_LEN: usize = 24;

/// One recovered mip level (levels 1..mipmap_count-1; level 0 is the main
/// payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    /// Zero bytes consumed before the level start. Always empty for DXT5.
    pub padding: Vec<u8>,
    /// The size field found in the stream, if one was present and plausible.
    pub declared_size: Option<u32>,
    /// The level's pixel data.
    pub data: Vec<u8>,
}

/// Whether `candidate` is a plausible size field for a level of
/// `expected` bytes.
///
/// The bounds are inclusive: exactly `expected * (1 + SIZE_TOLERANCE)` is
/// still accepted.
fn size_within_tolerance(candidate: u32, expected: usize) -> bool {
    let expected = expected as f64;
    let tolerance = expected * SIZE_TOLERANCE;
    let candidate = candidate as f64;
    candidate >= expected - tolerance && candidate <= expected + tolerance
}

/// Recover one raw (uncompressed) level.
///
/// Zero bytes are consumed as padding one at a time, bounded by
/// [`MAX_PADDING_SCAN`]. At every scan position the next 4 bytes are first
/// tested as a big-endian size field, so a size field with leading zero
/// bytes is found rather than partially eaten; this is what makes a chain
/// produced by [`serialize_chain`] reparse exactly. A nonzero byte whose
/// candidate is out of tolerance ends the scan and the computed size is
/// used.
fn read_raw_level(reader: &mut BinaryReader<'_>, expected: usize) -> Result<MipLevel> {
    let mut padding = Vec::new();
    let mut declared_size = None;

    loop {
        if let Ok(candidate) = reader.peek_u32_be() {
            if size_within_tolerance(candidate, expected) {
                reader.advance(4);
                declared_size = Some(candidate);
                break;
            }
        }
        if padding.len() >= MAX_PADDING_SCAN {
            break;
        }
        let byte = reader.peek_u8()?;
        if byte != 0 {
            break;
        }
        reader.advance(1);
        padding.push(0);
    }

    let size = declared_size.map_or(expected, |s| s as usize);
    if declared_size.is_none() {
        debug!(expected, pad = padding.len(), "no plausible size field, using computed size");
    } else {
        debug!(size, pad = padding.len(), "accepted size field");
    }

    let data = reader.read_bytes(size)?.to_vec();
    Ok(MipLevel {
        padding,
        declared_size,
        data,
    })
}

/// Recover one DXT5 level.
///
/// Scans ahead (up to [`DXT5_SCAN_WINDOW`] bytes) for the first nonzero
/// byte, then snaps the cursor down to the nearest preceding 16-byte
/// boundary: valid DXT5 blocks often begin with zero alpha bytes, and those
/// must not be mistaken for padding. Reader positions are file-absolute, so
/// the alignment matches the on-disk block grid. No padding is recorded for
/// this branch.
fn read_dxt5_level(reader: &mut BinaryReader<'_>, expected: usize) -> Result<MipLevel> {
    let start = reader.position();
    let mut zeros = 0usize;
    let mut found_data = false;

    while zeros < DXT5_SCAN_WINDOW {
        match reader.read_u8() {
            Ok(0) => zeros += 1,
            Ok(_) => {
                found_data = true;
                break;
            }
            Err(_) => break,
        }
    }

    if found_data {
        let non_zero_offset = start + zeros;
        let aligned = (non_zero_offset / DXT5_BLOCK_ALIGN) * DXT5_BLOCK_ALIGN;
        let aligned = aligned.max(start);
        debug!(
            start,
            non_zero_offset, aligned, "dxt5 level start snapped to block boundary"
        );
        reader.seek(aligned);
    } else {
        // Only zeros in the window: likely a blank level starting right here.
        reader.seek(start);
    }

    let mut declared_size = None;
    let mut size = expected;
    if let Ok(candidate) = reader.peek_u32_be() {
        if size_within_tolerance(candidate, expected) {
            debug!(candidate, "accepted dxt5 size field");
            reader.advance(4);
            declared_size = Some(candidate);
            size = candidate as usize;
        }
    }

    let data = reader.read_bytes(size)?.to_vec();
    Ok(MipLevel {
        padding: Vec::new(),
        declared_size,
        data,
    })
}

/// Read the fixed 24-byte trailer that closes the chain.
pub(crate) fn read_final_padding(reader: &mut BinaryReader<'_>) -> Result<[u8; FINAL_PADDING_LEN]> {
    let bytes = reader.read_bytes(FINAL_PADDING_LEN)?;
    let mut out = [0u8; FINAL_PADDING_LEN];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Parse the mip-level chain following the main payload.
///
/// `reader` must be positioned at the end of the main payload and its
/// positions must be file-absolute (the DXT5 alignment snap is defined on
/// absolute offsets). Levels 1..`mipmap_count`-1 are recovered, then the
/// 24-byte trailer.
///
/// Fails with an end-of-buffer error if the stream is exhausted before every
/// level and the trailer have been read; the caller must abort the whole
/// asset in that case.
pub fn parse_chain(
    reader: &mut BinaryReader<'_>,
    width: u32,
    height: u32,
    mipmap_count: u8,
    layout: PixelLayout,
) -> Result<(Vec<MipLevel>, [u8; FINAL_PADDING_LEN])> {
    let mut levels = Vec::with_capacity(mipmap_count.saturating_sub(1) as usize);

    for level in 1..u32::from(mipmap_count) {
        let expected = layout.level_size(width, height, level);
        debug!(level, expected, "parsing mip level");
        let record = match layout {
            PixelLayout::Rgba8 => read_raw_level(reader, expected)?,
            PixelLayout::Dxt5 => read_dxt5_level(reader, expected)?,
        };
        levels.push(record);
    }

    let final_padding = read_final_padding(reader)?;
    Ok((levels, final_padding))
}

/// Serialize a mip-level chain, optionally with replacement level data.
///
/// `replacements` must contain one buffer per level; pass the levels' own
/// data to re-serialize unchanged. Raw levels write the original padding, a
/// fresh big-endian size field for the (possibly new) data length, then the
/// data. DXT5 levels write the (empty) padding and the data directly with no
/// size field. The trailer is appended verbatim. Chain topology is preserved
/// even when replacement lengths differ from the originals.
pub fn serialize_chain(
    levels: &[MipLevel],
    final_padding: &[u8; FINAL_PADDING_LEN],
    replacements: &[Vec<u8>],
    layout: PixelLayout,
) -> Result<Vec<u8>> {
    if levels.len() != replacements.len() {
        return Err(Error::LevelCountMismatch {
            chain: levels.len(),
            provided: replacements.len(),
        });
    }

    let mut out = Vec::new();
    for (level, data) in levels.iter().zip(replacements) {
        out.extend_from_slice(&level.padding);
        if layout == PixelLayout::Rgba8 {
            out.write_u32::<BigEndian>(data.len() as u32)?;
        }
        out.extend_from_slice(data);
    }
    out.extend_from_slice(final_padding);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a synthetic raw chain for a 64x64 texture with 4 levels and the
    /// given per-level padding lengths. Each level carries a size field.
    fn synthetic_raw_chain(paddings: &[usize]) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, &pad) in paddings.iter().enumerate() {
            let level = (i + 1) as u32;
            let size = PixelLayout::Rgba8.level_size(64, 64, level);
            out.extend(std::iter::repeat(0u8).take(pad));
            out.extend_from_slice(&(size as u32).to_be_bytes());
            out.extend((0..size).map(|j| (j % 251 + 1) as u8));
        }
        out.extend_from_slice(&[0xEE; FINAL_PADDING_LEN]);
        out
    }

    #[test]
    fn test_raw_chain_round_trip() {
        let original = synthetic_raw_chain(&[0, 3, 7]);
        let mut reader = BinaryReader::new(&original);

        let (levels, trailer) =
            parse_chain(&mut reader, 64, 64, 4, PixelLayout::Rgba8).unwrap();
        assert!(reader.is_empty());
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].padding.len(), 0);
        assert_eq!(levels[1].padding.len(), 3);
        assert_eq!(levels[2].padding.len(), 7);
        assert_eq!(levels[0].declared_size, Some(32 * 32 * 4));

        let unchanged: Vec<Vec<u8>> = levels.iter().map(|l| l.data.clone()).collect();
        let serialized =
            serialize_chain(&levels, &trailer, &unchanged, PixelLayout::Rgba8).unwrap();
        assert_eq!(serialized, original);
    }

    #[test]
    fn test_size_field_tolerance_boundary() {
        // 20_000_000 has an exact integral +10% bound and a nonzero high
        // byte, so the candidate is read unshifted.
        let expected = 20_000_000usize;

        // Exactly +10.0%: accepted.
        let declared = 22_000_000u32;
        let mut stream = declared.to_be_bytes().to_vec();
        stream.extend(std::iter::repeat(7u8).take(declared as usize));
        let mut reader = BinaryReader::new(&stream);
        let level = read_raw_level(&mut reader, expected).unwrap();
        assert_eq!(level.declared_size, Some(declared));
        assert_eq!(level.data.len(), declared as usize);

        // One byte more (+10.0001%-ish): rejected, falls back to expected.
        let declared = 22_000_001u32;
        let mut stream = declared.to_be_bytes().to_vec();
        stream.extend(std::iter::repeat(7u8).take(declared as usize));
        let mut reader = BinaryReader::new(&stream);
        let level = read_raw_level(&mut reader, expected).unwrap();
        assert_eq!(level.declared_size, None);
        assert_eq!(level.data.len(), expected);
    }

    #[test]
    fn test_padding_scan_is_bounded() {
        let expected = 16usize;
        let mut stream = vec![0u8; MAX_PADDING_SCAN + 8];
        stream.extend(std::iter::repeat(5u8).take(expected));
        let mut reader = BinaryReader::new(&stream);

        let level = read_raw_level(&mut reader, expected).unwrap();
        assert_eq!(level.padding.len(), MAX_PADDING_SCAN);
        assert_eq!(level.declared_size, None);
    }

    #[test]
    fn test_dxt5_alignment_snaps_to_block_boundary() {
        // expected is a multiple of 16; the level's first block begins with
        // 9 zero bytes. The cursor must land on the 16-byte boundary at the
        // level start, not on the first nonzero byte.
        let expected = 8 * 8; // 2x2 blocks * 16
        let mut data = vec![0u8; expected];
        data[9] = 0xAB;
        for (i, b) in data.iter_mut().enumerate().skip(16) {
            *b = (i % 200 + 1) as u8;
        }

        // Position the level on a 16-byte file boundary.
        let mut file = vec![0xFFu8; 32];
        file.extend_from_slice(&data);
        file.extend_from_slice(&[0xEE; FINAL_PADDING_LEN]);

        let mut reader = BinaryReader::new_at(&file, 32);
        let level = read_dxt5_level(&mut reader, expected).unwrap();
        assert!(level.padding.is_empty());
        assert_eq!(level.data, data);
        assert_eq!(reader.position(), 32 + expected);
    }

    #[test]
    fn test_dxt5_misaligned_zeros_not_consumed() {
        // 25 zeros ahead of the data: the first nonzero byte is at absolute
        // offset 32 + 25 = 57, which snaps down to 48.
        let expected = 16usize;
        let mut file = vec![0xFFu8; 32];
        file.extend_from_slice(&[0u8; 25]);
        file.extend((0..expected - 9).map(|i| (i + 1) as u8));
        file.extend_from_slice(&[0xEE; FINAL_PADDING_LEN]);

        let mut reader = BinaryReader::new_at(&file, 32);
        let level = read_dxt5_level(&mut reader, expected).unwrap();
        assert_eq!(reader.position(), 48 + expected);
        // The recovered block keeps its genuine leading zeros.
        assert_eq!(&level.data[..7], &[0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(level.data[9], 1);
    }

    #[test]
    fn test_chain_eof_aborts() {
        // Chain claims 4 levels but the buffer ends mid-way.
        let truncated = synthetic_raw_chain(&[0, 3, 7]);
        let truncated = &truncated[..truncated.len() / 2];
        let mut reader = BinaryReader::new(truncated);
        assert!(parse_chain(&mut reader, 64, 64, 4, PixelLayout::Rgba8).is_err());
    }

    #[test]
    fn test_serialize_dxt5_has_no_size_field() {
        let levels = vec![MipLevel {
            padding: Vec::new(),
            declared_size: None,
            data: vec![0xAA; 32],
        }];
        let trailer = [0u8; FINAL_PADDING_LEN];
        let replacement = vec![vec![0xBB; 48]];

        let out = serialize_chain(&levels, &trailer, &replacement, PixelLayout::Dxt5).unwrap();
        assert_eq!(out.len(), 48 + FINAL_PADDING_LEN);
        assert_eq!(&out[..48], &[0xBB; 48][..]);
    }

    #[test]
    fn test_serialize_rejects_count_mismatch() {
        let trailer = [0u8; FINAL_PADDING_LEN];
        let err = serialize_chain(&[], &trailer, &[vec![1, 2]], PixelLayout::Rgba8).unwrap_err();
        assert!(matches!(err, Error::LevelCountMismatch { .. }));
    }
}
