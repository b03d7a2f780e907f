//! DDS container header handling.
//!
//! The conversion target for CTXR assets is a plain 128-byte DDS header
//! (magic + 124-byte header), either uncompressed 32-bit RGBA or DXT1/DXT5
//! block-compressed. Two construction modes are provided:
//!
//! - [`build`] writes a header from scratch with internally consistent
//!   flags and caps bits.
//! - [`patch`] rewrites only the dimension and mip fields of a known-good
//!   template captured from a companion asset, preserving vendor extensions.

mod builder;
mod error;
mod header;

pub use builder::{build, parse, patch, DdsInfo, DDS_FILE_HEADER_SIZE};
pub use error::{Error, Result};
pub use header::{
    DdsFormat, DdsHeader, DdsPixelFormat, FourCC, DDPF_ALPHAPIXELS, DDPF_FOURCC, DDPF_RGB,
    DDSCAPS_COMPLEX, DDSCAPS_MIPMAP, DDSCAPS_TEXTURE, DDSD_CAPS, DDSD_HEIGHT, DDSD_LINEARSIZE,
    DDSD_MIPMAPCOUNT, DDSD_PITCH, DDSD_PIXELFORMAT, DDSD_WIDTH, RGBA8_A_MASK, RGBA8_B_MASK,
    RGBA8_G_MASK, RGBA8_R_MASK,
};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
