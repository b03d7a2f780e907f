//! DDS header structures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Header flags (DDSD_*).
pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PITCH: u32 = 0x8;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20000;
pub const DDSD_LINEARSIZE: u32 = 0x80000;

/// Pixel format flags (DDPF_*).
pub const DDPF_ALPHAPIXELS: u32 = 0x1;
pub const DDPF_FOURCC: u32 = 0x4;
pub const DDPF_RGB: u32 = 0x40;

/// Surface capability flags (DDSCAPS_*).
pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;
pub const DDSCAPS_MIPMAP: u32 = 0x400000;

/// Channel masks for 32-bit RGBA.
pub const RGBA8_R_MASK: u32 = 0x0000_00FF;
pub const RGBA8_G_MASK: u32 = 0x0000_FF00;
pub const RGBA8_B_MASK: u32 = 0x00FF_0000;
pub const RGBA8_A_MASK: u32 = 0xFF00_0000;

/// DDS file header (the 124 bytes following the magic).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Expected pixel-format block size.
    pub const SIZE: u32 = 32;
}

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// No compression tag.
    pub const NONE: Self = Self([0; 4]);
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
}

/// Pixel formats this codec emits and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsFormat {
    /// Uncompressed 32-bit RGBA.
    Rgba8,
    /// DXT1 / BC1 block compression, 8 bytes per 4x4 block.
    Dxt1,
    /// DXT5 / BC3 block compression, 16 bytes per 4x4 block.
    Dxt5,
}

impl DdsFormat {
    /// Whether this is a block-compressed format.
    pub const fn is_compressed(&self) -> bool {
        !matches!(self, DdsFormat::Rgba8)
    }

    /// Bytes per 4x4 block for compressed formats.
    pub const fn bytes_per_block(&self) -> u32 {
        match self {
            DdsFormat::Dxt1 => 8,
            _ => 16,
        }
    }

    /// The FourCC tag for compressed formats.
    pub const fn four_cc(&self) -> FourCC {
        match self {
            DdsFormat::Rgba8 => FourCC::NONE,
            DdsFormat::Dxt1 => FourCC::DXT1,
            DdsFormat::Dxt5 => FourCC::DXT5,
        }
    }
}
