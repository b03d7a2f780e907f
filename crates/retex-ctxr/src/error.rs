//! Error types for CTXR handling.

use thiserror::Error;

/// Errors that can occur when working with CTXR files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] retex_common::Error),

    /// Header shorter than the fixed 132 bytes.
    #[error("truncated CTXR header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Replacement mip data does not match the chain being serialized.
    #[error("mip level count mismatch: chain has {chain} levels, got {provided} replacements")]
    LevelCountMismatch { chain: usize, provided: usize },
}

/// Result type for CTXR operations.
pub type Result<T> = std::result::Result<T, Error>;
