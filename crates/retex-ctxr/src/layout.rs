//! Pixel payload layouts.

/// Bytes per DXT5 block (4x4 pixels with interpolated alpha).
pub const DXT5_BLOCK_SIZE: usize = 16;

/// How the pixel payload of a CTXR asset is stored.
///
/// This is per-asset configuration: nothing in the CTXR header says whether
/// the payload is raw or block-compressed, so the caller has to know (see the
/// asset manifest in `retex-convert`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PixelLayout {
    /// Raw 4-bytes-per-pixel data (stored BGRA on disk).
    Rgba8,
    /// DXT5 / BC3 block-compressed data, passed through untouched.
    Dxt5,
}

impl PixelLayout {
    /// Whether this layout is block-compressed.
    pub const fn is_compressed(&self) -> bool {
        matches!(self, PixelLayout::Dxt5)
    }

    /// Size in bytes of a surface with the given pixel dimensions.
    pub fn surface_size(&self, width: u32, height: u32) -> usize {
        match self {
            PixelLayout::Rgba8 => width as usize * height as usize * 4,
            PixelLayout::Dxt5 => {
                let blocks_w = (width as usize).div_ceil(4).max(1);
                let blocks_h = (height as usize).div_ceil(4).max(1);
                blocks_w * blocks_h * DXT5_BLOCK_SIZE
            }
        }
    }

    /// Expected byte size of mip level `level` of a `width` x `height`
    /// texture. Level 0 is the base image.
    pub fn level_size(&self, width: u32, height: u32, level: u32) -> usize {
        let mip_w = (width >> level).max(1);
        let mip_h = (height >> level).max(1);
        self.surface_size(mip_w, mip_h)
    }
}

/// Dimensions of mip level `level`, each axis halved and clamped at 1.
pub fn level_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    ((width >> level).max(1), (height >> level).max(1))
}
