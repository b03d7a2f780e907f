//! retex - CTXR game texture conversion library.
//!
//! This crate provides a unified interface to the retex library ecosystem
//! for working with CTXR texture containers.
//!
//! # Crates
//!
//! - [`retex_common`] - Common utilities (binary reading, shared errors)
//! - [`retex_ctxr`] - The CTXR container (header, mip chain, pixel swap)
//! - [`retex_dds`] - Bit-exact DDS header build/parse/patch
//! - [`retex_ps3`] - PS3-build header and Morton-order tiling
//! - [`retex_convert`] - Single-file and batch conversion jobs
//!
//! # Example
//!
//! ```no_run
//! use retex::prelude::*;
//!
//! let data = std::fs::read("texture.ctxr")?;
//! let ctxr = CtxrFile::parse(&data, PixelLayout::Rgba8)?;
//! let dds = ctxr_to_dds(&ctxr, None)?;
//! std::fs::write("texture.dds", dds)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use retex_common as common;
pub use retex_convert as convert;
pub use retex_ctxr as ctxr;
pub use retex_dds as dds;
pub use retex_ps3 as ps3;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use retex_common::BinaryReader;
    pub use retex_convert::{
        convert_directory, convert_file, ctxr_to_dds, dds_to_ctxr, ps3_ctxr_to_dds, AssetManifest,
        BatchJob, BatchReport, ConvertOptions, TargetFormat,
    };
    pub use retex_ctxr::{CtxrFile, CtxrHeader, MipLevel, PixelLayout};
    pub use retex_dds::{DdsFormat, DdsInfo};
    pub use retex_ps3::{deswizzle, Ps3Header};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
