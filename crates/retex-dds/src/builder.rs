//! DDS header construction, parsing and template patching.

use retex_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::header::*;
use crate::{Error, Result, DDS_MAGIC};

/// Size of the magic plus header: the offset of the first payload byte.
pub const DDS_FILE_HEADER_SIZE: usize = 128;

// File offsets of the patchable fields (magic included).
const FLAGS_OFFSET: usize = 8;
const HEIGHT_OFFSET: usize = 12;
const WIDTH_OFFSET: usize = 16;
const PITCH_OR_LINEAR_SIZE_OFFSET: usize = 20;
const MIPMAP_COUNT_OFFSET: usize = 28;
const CAPS_OFFSET: usize = 108;

/// Parsed view of a DDS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsInfo {
    pub width: u32,
    pub height: u32,
    /// Raw mipmap count field; 0 and 1 both mean "no extra levels".
    pub mipmap_count: u32,
    pub format: DdsFormat,
    pub pitch_or_linear_size: u32,
}

impl DdsInfo {
    /// Number of levels including the base image, at least 1.
    pub fn level_count(&self) -> u32 {
        self.mipmap_count.max(1)
    }
}

fn pitch_or_linear_size(width: u32, format: DdsFormat) -> u32 {
    match format {
        DdsFormat::Rgba8 => width * 4,
        _ => width.div_ceil(4).max(1) * format.bytes_per_block(),
    }
}

fn flags_for(mipmap_count: u32, format: DdsFormat) -> u32 {
    let mut flags = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT;
    if mipmap_count > 1 {
        flags |= DDSD_MIPMAPCOUNT;
    }
    if format.is_compressed() {
        flags |= DDSD_LINEARSIZE;
    }
    flags
}

fn caps_for(mipmap_count: u32) -> u32 {
    let mut caps = DDSCAPS_TEXTURE;
    if mipmap_count > 1 {
        caps |= DDSCAPS_COMPLEX | DDSCAPS_MIPMAP;
    }
    caps
}

/// Build a 128-byte DDS header (magic included) from scratch.
pub fn build(width: u32, height: u32, mipmap_count: u32, format: DdsFormat) -> [u8; DDS_FILE_HEADER_SIZE] {
    let pixel_format = if format.is_compressed() {
        DdsPixelFormat {
            size: DdsPixelFormat::SIZE,
            flags: DDPF_FOURCC,
            four_cc: format.four_cc(),
            rgb_bit_count: 0,
            r_bit_mask: 0,
            g_bit_mask: 0,
            b_bit_mask: 0,
            a_bit_mask: 0,
        }
    } else {
        DdsPixelFormat {
            size: DdsPixelFormat::SIZE,
            flags: DDPF_RGB | DDPF_ALPHAPIXELS,
            four_cc: FourCC::NONE,
            rgb_bit_count: 32,
            r_bit_mask: RGBA8_R_MASK,
            g_bit_mask: RGBA8_G_MASK,
            b_bit_mask: RGBA8_B_MASK,
            a_bit_mask: RGBA8_A_MASK,
        }
    };

    let header = DdsHeader {
        size: DdsHeader::SIZE,
        flags: flags_for(mipmap_count, format),
        height,
        width,
        pitch_or_linear_size: pitch_or_linear_size(width, format),
        depth: 0,
        mipmap_count,
        reserved1: [0; 11],
        pixel_format,
        caps: caps_for(mipmap_count),
        caps2: 0,
        caps3: 0,
        caps4: 0,
        reserved2: 0,
    };

    let mut out = [0u8; DDS_FILE_HEADER_SIZE];
    out[..4].copy_from_slice(DDS_MAGIC);
    out[4..].copy_from_slice(header.as_bytes());
    out
}

/// Parse a DDS header from the start of `data`.
pub fn parse(data: &[u8]) -> Result<DdsInfo> {
    if data.len() < DDS_FILE_HEADER_SIZE {
        return Err(Error::TruncatedHeader {
            expected: DDS_FILE_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let magic: [u8; 4] = data[..4].try_into().expect("slice length checked");
    if &magic != DDS_MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let mut reader = BinaryReader::new_at(data, 4);
    let header: DdsHeader = reader.read_struct()?;

    if header.size != DdsHeader::SIZE {
        return Err(Error::InvalidHeader(format!(
            "header size {} (expected {})",
            { header.size },
            DdsHeader::SIZE
        )));
    }

    let pf = header.pixel_format;
    let format = if pf.flags & DDPF_FOURCC != 0 {
        match pf.four_cc {
            FourCC::DXT1 => DdsFormat::Dxt1,
            FourCC::DXT5 => DdsFormat::Dxt5,
            other => {
                return Err(Error::UnsupportedFormat(
                    String::from_utf8_lossy(&other.0).into_owned(),
                ))
            }
        }
    } else if pf.rgb_bit_count == 32 {
        DdsFormat::Rgba8
    } else {
        return Err(Error::UnsupportedFormat(format!(
            "{}-bit uncompressed",
            { pf.rgb_bit_count }
        )));
    };

    Ok(DdsInfo {
        width: header.width,
        height: header.height,
        mipmap_count: header.mipmap_count,
        format,
        pitch_or_linear_size: header.pitch_or_linear_size,
    })
}

/// Patch a captured header template instead of building one from scratch.
///
/// Only width, height, pitch/linear size, mipmap count and the mip-related
/// flag and caps bits are rewritten; every other byte of the template is
/// preserved. Vendor-specific header extensions a from-scratch build would
/// drop survive this way.
pub fn patch(
    template: &[u8],
    width: u32,
    height: u32,
    mipmap_count: u32,
    format: DdsFormat,
) -> Result<[u8; DDS_FILE_HEADER_SIZE]> {
    if template.len() < DDS_FILE_HEADER_SIZE {
        return Err(Error::TruncatedHeader {
            expected: DDS_FILE_HEADER_SIZE,
            actual: template.len(),
        });
    }
    let magic: [u8; 4] = template[..4].try_into().expect("slice length checked");
    if &magic != DDS_MAGIC {
        return Err(Error::BadMagic(magic));
    }

    let mut out = [0u8; DDS_FILE_HEADER_SIZE];
    out.copy_from_slice(&template[..DDS_FILE_HEADER_SIZE]);

    let read_u32 = |bytes: &[u8; DDS_FILE_HEADER_SIZE], offset: usize| {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    };
    let write_u32 = |bytes: &mut [u8; DDS_FILE_HEADER_SIZE], offset: usize, value: u32| {
        bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    };

    let mut flags = read_u32(&out, FLAGS_OFFSET);
    flags &= !(DDSD_MIPMAPCOUNT | DDSD_LINEARSIZE | DDSD_PITCH);
    flags |= flags_for(mipmap_count, format)
        & (DDSD_MIPMAPCOUNT | DDSD_LINEARSIZE | DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT);

    let mut caps = read_u32(&out, CAPS_OFFSET);
    caps &= !(DDSCAPS_COMPLEX | DDSCAPS_MIPMAP);
    caps |= caps_for(mipmap_count);

    write_u32(&mut out, FLAGS_OFFSET, flags);
    write_u32(&mut out, HEIGHT_OFFSET, height);
    write_u32(&mut out, WIDTH_OFFSET, width);
    write_u32(&mut out, PITCH_OR_LINEAR_SIZE_OFFSET, pitch_or_linear_size(width, format));
    write_u32(&mut out, MIPMAP_COUNT_OFFSET, mipmap_count);
    write_u32(&mut out, CAPS_OFFSET, caps);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_parse_round_trip_dxt5() {
        let header = build(256, 256, 1, DdsFormat::Dxt5);
        let info = parse(&header).unwrap();

        assert_eq!(info.width, 256);
        assert_eq!(info.height, 256);
        assert_eq!(info.mipmap_count, 1);
        assert_eq!(info.format, DdsFormat::Dxt5);
        assert_eq!(info.pitch_or_linear_size, 64 * 16);
        assert_eq!(&header[84..88], &b"DXT5"[..]);
    }

    #[test]
    fn test_build_rgba8_masks_and_flags() {
        let header = build(128, 64, 4, DdsFormat::Rgba8);
        let info = parse(&header).unwrap();

        assert_eq!(info.format, DdsFormat::Rgba8);
        assert_eq!(info.pitch_or_linear_size, 128 * 4);

        let flags = u32::from_le_bytes(header[8..12].try_into().unwrap());
        assert_eq!(
            flags,
            DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_MIPMAPCOUNT
        );
        let caps = u32::from_le_bytes(header[108..112].try_into().unwrap());
        assert_eq!(caps, DDSCAPS_TEXTURE | DDSCAPS_COMPLEX | DDSCAPS_MIPMAP);

        let r_mask = u32::from_le_bytes(header[92..96].try_into().unwrap());
        let a_mask = u32::from_le_bytes(header[104..108].try_into().unwrap());
        assert_eq!(r_mask, RGBA8_R_MASK);
        assert_eq!(a_mask, RGBA8_A_MASK);
    }

    #[test]
    fn test_bad_magic() {
        let mut header = build(16, 16, 1, DdsFormat::Rgba8);
        header[..4].copy_from_slice(b"NOPE");
        assert!(matches!(parse(&header), Err(Error::BadMagic(_))));
    }

    #[test]
    fn test_truncated() {
        let header = build(16, 16, 1, DdsFormat::Rgba8);
        assert!(matches!(
            parse(&header[..100]),
            Err(Error::TruncatedHeader { actual: 100, .. })
        ));
    }

    #[test]
    fn test_patch_preserves_opaque_bytes() {
        let mut template = build(64, 64, 1, DdsFormat::Dxt5);
        // A vendor extension a from-scratch build would not produce.
        template[32..36].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        template[124..128].copy_from_slice(&0x1234_5678u32.to_le_bytes());

        let patched = patch(&template, 512, 256, 9, DdsFormat::Dxt5).unwrap();
        let info = parse(&patched).unwrap();

        assert_eq!(info.width, 512);
        assert_eq!(info.height, 256);
        assert_eq!(info.mipmap_count, 9);
        assert_eq!(&patched[32..36], &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(&patched[124..128], &0x1234_5678u32.to_le_bytes());

        let caps = u32::from_le_bytes(patched[108..112].try_into().unwrap());
        assert_ne!(caps & DDSCAPS_MIPMAP, 0);
    }
}
