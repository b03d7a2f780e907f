//! Error types for DDS handling.

use thiserror::Error;

/// Errors that can occur when working with DDS headers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] retex_common::Error),

    /// Invalid DDS magic.
    #[error("invalid DDS magic: expected 'DDS ', got {0:?}")]
    BadMagic([u8; 4]),

    /// Fewer bytes than a full 128-byte header.
    #[error("truncated DDS header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Structurally invalid header.
    #[error("invalid DDS header: {0}")]
    InvalidHeader(String),

    /// Pixel format this codec does not handle.
    #[error("unsupported DDS pixel format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for DDS operations.
pub type Result<T> = std::result::Result<T, Error>;
