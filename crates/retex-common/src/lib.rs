//! Common utilities for retex.
//!
//! This crate provides the foundational types used across all retex crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices, with both
//!   big- and little-endian primitive reads
//! - [`Error`] / [`Result`] - the shared low-level error type

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
