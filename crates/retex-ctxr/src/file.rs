//! Whole-file CTXR model.

use std::fs;
use std::path::Path;

use retex_common::BinaryReader;

use crate::header::{CtxrHeader, CTXR_HEADER_SIZE};
use crate::layout::PixelLayout;
use crate::mips::{
    parse_chain, read_final_padding, serialize_chain, MipLevel, FINAL_PADDING_LEN,
};
use crate::Result;

/// A parsed CTXR asset: header, main payload, recovered mip chain and the
/// fixed trailer.
///
/// Parsing keeps every structural byte (opaque header bytes, inter-level
/// padding, trailer) so that re-serializing with unchanged pixel data
/// reproduces the source asset, and re-serializing with replacement data
/// preserves the chain topology the game expects.
#[derive(Debug, Clone)]
pub struct CtxrFile {
    header: CtxrHeader,
    pixel_data: Vec<u8>,
    mip_levels: Vec<MipLevel>,
    final_padding: [u8; FINAL_PADDING_LEN],
    layout: PixelLayout,
}

impl CtxrFile {
    /// Parse a CTXR asset from raw file bytes.
    ///
    /// `layout` says whether the payload is raw BGRA8 or DXT5; the header
    /// does not declare this, so it comes from per-asset configuration.
    pub fn parse(data: &[u8], layout: PixelLayout) -> Result<Self> {
        let header = CtxrHeader::parse(data)?;

        let mut reader = BinaryReader::new_at(data, CTXR_HEADER_SIZE);
        let pixel_data = reader
            .read_bytes(header.pixel_data_length() as usize)?
            .to_vec();

        let (mip_levels, final_padding) = if header.mipmap_count() > 1 {
            parse_chain(
                &mut reader,
                u32::from(header.width()),
                u32::from(header.height()),
                header.mipmap_count(),
                layout,
            )?
        } else {
            (Vec::new(), read_final_padding(&mut reader)?)
        };

        Ok(Self {
            header,
            pixel_data,
            mip_levels,
            final_padding,
            layout,
        })
    }

    /// Read and parse a CTXR file from disk.
    pub fn open<P: AsRef<Path>>(path: P, layout: PixelLayout) -> Result<Self> {
        let data = fs::read(path)?;
        Self::parse(&data, layout)
    }

    /// The 132-byte header.
    pub fn header(&self) -> &CtxrHeader {
        &self.header
    }

    /// The main (level 0) pixel payload.
    pub fn pixel_data(&self) -> &[u8] {
        &self.pixel_data
    }

    /// The recovered mip levels (1..mipmap_count-1).
    pub fn mip_levels(&self) -> &[MipLevel] {
        &self.mip_levels
    }

    /// The fixed 24-byte trailer.
    pub fn final_padding(&self) -> &[u8; FINAL_PADDING_LEN] {
        &self.final_padding
    }

    /// The payload layout this file was parsed with.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Texture width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.header.width())
    }

    /// Texture height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.header.height())
    }

    /// Serialize back to CTXR bytes with the current pixel data.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let unchanged: Vec<Vec<u8>> = self.mip_levels.iter().map(|l| l.data.clone()).collect();
        self.to_bytes_with(&self.pixel_data, &unchanged)
    }

    /// Serialize to CTXR bytes with replacement pixel data.
    ///
    /// The header's width/height/mipmap count are kept; the pixel data
    /// length field is refreshed from `main`. `mips` must contain one buffer
    /// per chain level.
    pub fn to_bytes_with(&self, main: &[u8], mips: &[Vec<u8>]) -> Result<Vec<u8>> {
        let header = self.header.with_updated(
            self.header.width(),
            self.header.height(),
            self.header.mipmap_count(),
            main.len() as u32,
        );

        let mut out = Vec::with_capacity(CTXR_HEADER_SIZE + main.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(main);
        out.extend_from_slice(&serialize_chain(
            &self.mip_levels,
            &self.final_padding,
            mips,
            self.layout,
        )?);
        Ok(out)
    }

    /// Build a new asset from this one used as a template.
    ///
    /// The opaque header bytes, per-level padding and trailer come from the
    /// template; dimensions, mip count and payload come from the caller.
    /// When the template's chain does not match `mips` in level count the
    /// structural bytes cannot be reused, and the chain falls back to empty
    /// paddings and a zeroed trailer.
    pub fn from_template(
        template: &CtxrFile,
        width: u16,
        height: u16,
        main: Vec<u8>,
        mips: Vec<Vec<u8>>,
        layout: PixelLayout,
    ) -> Self {
        let mipmap_count = (mips.len() + 1) as u8;
        let header =
            template
                .header
                .with_updated(width, height, mipmap_count, main.len() as u32);

        let (mip_levels, final_padding) = if template.mip_levels.len() == mips.len() {
            let levels = template
                .mip_levels
                .iter()
                .zip(&mips)
                .map(|(l, data)| MipLevel {
                    padding: l.padding.clone(),
                    declared_size: Some(data.len() as u32),
                    data: data.clone(),
                })
                .collect();
            (levels, template.final_padding)
        } else {
            let levels = mips
                .iter()
                .map(|data| MipLevel {
                    padding: Vec::new(),
                    declared_size: Some(data.len() as u32),
                    data: data.clone(),
                })
                .collect();
            (levels, [0u8; FINAL_PADDING_LEN])
        };

        Self {
            header,
            pixel_data: main,
            mip_levels,
            final_padding,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::CTXR_HEADER_SIZE;

    fn make_header(width: u16, height: u16, mipmap_count: u8, payload_len: u32) -> Vec<u8> {
        let mut bytes = vec![0x11u8; CTXR_HEADER_SIZE];
        bytes[8..10].copy_from_slice(&width.to_be_bytes());
        bytes[10..12].copy_from_slice(&height.to_be_bytes());
        bytes[0x26] = mipmap_count;
        bytes[0x80..0x84].copy_from_slice(&payload_len.to_be_bytes());
        bytes
    }

    #[test]
    fn test_single_level_round_trip() {
        // mipmap_count == 1: header + payload + trailer only.
        let payload: Vec<u8> = (0..16 * 16 * 4).map(|i| (i % 255 + 1) as u8).collect();
        let mut file = make_header(16, 16, 1, payload.len() as u32);
        file.extend_from_slice(&payload);
        file.extend_from_slice(&[0x5A; FINAL_PADDING_LEN]);

        let parsed = CtxrFile::parse(&file, PixelLayout::Rgba8).unwrap();
        assert_eq!(parsed.width(), 16);
        assert_eq!(parsed.pixel_data(), &payload[..]);
        assert!(parsed.mip_levels().is_empty());

        assert_eq!(parsed.to_bytes().unwrap(), file);
    }

    #[test]
    fn test_chained_round_trip() {
        let payload: Vec<u8> = (0..64 * 64 * 4).map(|i| (i % 253 + 1) as u8).collect();
        let mut file = make_header(64, 64, 3, payload.len() as u32);
        file.extend_from_slice(&payload);
        for level in 1..3u32 {
            let size = PixelLayout::Rgba8.level_size(64, 64, level);
            file.extend_from_slice(&[0, 0, 0]); // inter-level padding
            file.extend_from_slice(&(size as u32).to_be_bytes());
            file.extend((0..size).map(|j| (j % 250 + 1) as u8));
        }
        file.extend_from_slice(&[0x42; FINAL_PADDING_LEN]);

        let parsed = CtxrFile::parse(&file, PixelLayout::Rgba8).unwrap();
        assert_eq!(parsed.mip_levels().len(), 2);
        assert_eq!(parsed.to_bytes().unwrap(), file);
    }

    #[test]
    fn test_truncated_payload_fails() {
        let file = make_header(16, 16, 1, 1024);
        // Payload length declared but absent.
        assert!(CtxrFile::parse(&file, PixelLayout::Rgba8).is_err());
    }

    #[test]
    fn test_from_template_patches_fields_and_keeps_structure() {
        let payload = vec![1u8; 8 * 8 * 4];
        let mut file = make_header(8, 8, 2, payload.len() as u32);
        file.extend_from_slice(&payload);
        let mip_size = PixelLayout::Rgba8.level_size(8, 8, 1);
        file.extend_from_slice(&[0, 0, 0, 0, 0]); // 5 bytes padding
        file.extend_from_slice(&(mip_size as u32).to_be_bytes());
        file.extend(std::iter::repeat(9u8).take(mip_size));
        file.extend_from_slice(&[0x77; FINAL_PADDING_LEN]);

        let template = CtxrFile::parse(&file, PixelLayout::Rgba8).unwrap();

        let new_main = vec![3u8; 8 * 8 * 4];
        let new_mip = vec![4u8; mip_size];
        let rebuilt = CtxrFile::from_template(
            &template,
            8,
            8,
            new_main.clone(),
            vec![new_mip.clone()],
            PixelLayout::Rgba8,
        );

        let bytes = rebuilt.to_bytes().unwrap();
        let reparsed = CtxrFile::parse(&bytes, PixelLayout::Rgba8).unwrap();
        assert_eq!(reparsed.pixel_data(), &new_main[..]);
        assert_eq!(reparsed.mip_levels()[0].data, new_mip);
        assert_eq!(reparsed.mip_levels()[0].padding.len(), 5);
        assert_eq!(reparsed.final_padding(), &[0x77; FINAL_PADDING_LEN]);
        // Opaque header bytes survive the template round trip.
        assert_eq!(bytes[0], 0x11);
    }
}
