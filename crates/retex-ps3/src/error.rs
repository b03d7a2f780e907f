//! Error types for PS3 CTXR handling.

use thiserror::Error;

/// Errors that can occur when working with PS3 CTXR assets.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] retex_common::Error),

    /// Invalid PS3 CTXR magic.
    #[error("invalid PS3 CTXR magic: expected [02, 00, 01, 01], got {0:?}")]
    BadMagic([u8; 4]),

    /// Header shorter than the fixed 128 bytes.
    #[error("truncated PS3 CTXR header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Pixel payload too short for the tiled extent of the texture.
    #[error("payload too short for tiled texture: needed {needed} bytes, got {available}")]
    PayloadTooShort { needed: usize, available: usize },
}

/// Result type for PS3 CTXR operations.
pub type Result<T> = std::result::Result<T, Error>;
