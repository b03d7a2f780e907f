//! PS3-build CTXR support.
//!
//! The PS3 release of the game ships the same textures in a different
//! wrapper: a 128-byte header (see [`Ps3Header`]) and, for most assets, a
//! pixel payload tiled along a Morton curve (see [`swizzle`]). Converting
//! these assets means parsing the header, untiling the payload if the asset
//! is tiled, and applying the observed channel permutation.

mod error;
mod header;

pub mod swizzle;

pub use error::{Error, Result};
pub use header::{Ps3Header, PS3_HEADER_SIZE, PS3_MAGIC};
pub use swizzle::{
    deswizzle, permute_channels, swizzle as swizzle_pixels, z_index, LINEAR_CHANNEL_ORDER,
    SWIZZLED_CHANNEL_ORDER,
};
