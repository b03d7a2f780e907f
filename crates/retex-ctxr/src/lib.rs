//! CTXR texture container handling.
//!
//! CTXR is the proprietary texture container used by a remastered game's PC
//! build: a fixed 132-byte header, a main pixel payload (raw BGRA8 or DXT5),
//! an optional mip-level chain with undeclared inter-level padding, and a
//! fixed 24-byte trailer.
//!
//! The chain carries no explicit layout information, so parsing recovers the
//! padding heuristically; see [`mips`] for the exact rules. Opaque header
//! bytes, padding and trailer are preserved so that assets round-trip
//! byte-exact.
//!
//! # Example
//!
//! ```no_run
//! use retex_ctxr::{CtxrFile, PixelLayout};
//!
//! let data = std::fs::read("texture.ctxr")?;
//! let ctxr = CtxrFile::parse(&data, PixelLayout::Rgba8)?;
//! println!("{}x{}, {} mip levels", ctxr.width(), ctxr.height(), ctxr.header().mipmap_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod file;
mod header;
mod layout;

pub mod mips;
pub mod pixel;

pub use error::{Error, Result};
pub use file::CtxrFile;
pub use header::{CtxrHeader, CTXR_HEADER_SIZE};
pub use layout::{level_dimensions, PixelLayout, DXT5_BLOCK_SIZE};
pub use mips::{MipLevel, FINAL_PADDING_LEN};
