//! PS3 CTXR to DDS conversion.

use retex_common::BinaryReader;
use retex_dds::DdsFormat;
use retex_ps3::{
    deswizzle, permute_channels, Ps3Header, LINEAR_CHANNEL_ORDER, SWIZZLED_CHANNEL_ORDER,
};
use tracing::info;

use crate::Result;

/// Convert a PS3-build CTXR asset to an uncompressed DDS.
///
/// `swizzled` must come from per-asset configuration: a wrong value produces
/// scrambled pixels that no format check can catch. Tiled assets are
/// deswizzled and their channels reordered with [`SWIZZLED_CHANNEL_ORDER`];
/// linear assets only get [`LINEAR_CHANNEL_ORDER`] applied. When a template
/// DDS header is supplied its dimension fields are patched; otherwise a
/// header is built from scratch.
pub fn ps3_ctxr_to_dds(
    data: &[u8],
    swizzled: bool,
    dds_template: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let header = Ps3Header::parse(data)?;
    let width = u32::from(header.width());
    let height = u32::from(header.height());

    let mut reader = BinaryReader::new_at(data, header.pixel_data_offset() as usize);
    let payload = reader.read_bytes(header.pixel_data_length() as usize)?;

    info!(width, height, swizzled, "converting PS3 asset");

    let pixels = if swizzled {
        let mut pixels = deswizzle(payload, width, height)?;
        permute_channels(&mut pixels, SWIZZLED_CHANNEL_ORDER);
        pixels
    } else {
        let mut pixels = payload.to_vec();
        permute_channels(&mut pixels, LINEAR_CHANNEL_ORDER);
        pixels
    };

    let mipmap_count = u32::from(header.mipmap_count());
    let dds_header = match dds_template {
        Some(template) => {
            retex_dds::patch(template, width, height, mipmap_count, DdsFormat::Rgba8)?
        }
        None => retex_dds::build(width, height, mipmap_count, DdsFormat::Rgba8),
    };

    let mut out = Vec::with_capacity(dds_header.len() + pixels.len());
    out.extend_from_slice(&dds_header);
    out.extend_from_slice(&pixels);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retex_dds::DDS_FILE_HEADER_SIZE;
    use retex_ps3::{swizzle_pixels, PS3_HEADER_SIZE, PS3_MAGIC};

    fn make_ps3_file(width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
        let mut file = vec![0u8; PS3_HEADER_SIZE];
        file[..4].copy_from_slice(&PS3_MAGIC);
        file[4..8].copy_from_slice(&(payload.len() as u32).to_be_bytes());
        file[16..20].copy_from_slice(&(PS3_HEADER_SIZE as u32).to_be_bytes());
        file[20..24].copy_from_slice(&(payload.len() as u32).to_be_bytes());
        file[37] = 1;
        file[44..46].copy_from_slice(&width.to_be_bytes());
        file[46..48].copy_from_slice(&height.to_be_bytes());
        file.extend_from_slice(payload);
        file
    }

    #[test]
    fn test_linear_asset_gets_channel_reorder_only() {
        let payload: Vec<u8> = (0..8u32 * 8 * 4).map(|i| i as u8).collect();
        let file = make_ps3_file(8, 8, &payload);

        let dds = ps3_ctxr_to_dds(&file, false, None).unwrap();
        let pixels = &dds[DDS_FILE_HEADER_SIZE..];

        // First pixel [0,1,2,3] reordered by [3,1,2,0].
        assert_eq!(&pixels[..4], &[3, 1, 2, 0]);
        assert_eq!(pixels.len(), payload.len());
    }

    #[test]
    fn test_swizzled_asset_is_untiled() {
        let width = 8u32;
        let height = 8u32;
        let linear: Vec<u8> = (0..width * height * 4).map(|i| (i % 251) as u8).collect();
        let tiled = swizzle_pixels(&linear, width, height).unwrap();
        let file = make_ps3_file(width as u16, height as u16, &tiled);

        let dds = ps3_ctxr_to_dds(&file, true, None).unwrap();
        let pixels = &dds[DDS_FILE_HEADER_SIZE..];

        let mut expected = linear;
        permute_channels(&mut expected, SWIZZLED_CHANNEL_ORDER);
        assert_eq!(pixels, &expected[..]);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let file = vec![0u8; 256];
        assert!(ps3_ctxr_to_dds(&file, true, None).is_err());
    }
}
