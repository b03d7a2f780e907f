//! Error types for conversion jobs.

use thiserror::Error;

/// Errors that can occur during a conversion.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] retex_common::Error),

    /// CTXR container error.
    #[error("CTXR: {0}")]
    Ctxr(#[from] retex_ctxr::Error),

    /// DDS container error.
    #[error("DDS: {0}")]
    Dds(#[from] retex_dds::Error),

    /// PS3 container error.
    #[error("PS3 CTXR: {0}")]
    Ps3(#[from] retex_ps3::Error),

    /// Raster codec error.
    #[error("image codec: {0}")]
    Image(#[from] image::ImageError),

    /// Manifest parse error.
    #[error("manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Source or target the converter does not handle.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Required configuration (template, manifest) is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Pixel payload does not match the declared dimensions.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
