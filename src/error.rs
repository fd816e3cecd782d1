//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration and serialization entry points.
pub type Result<T> = std::result::Result<T, MeteringError>;

/// Errors raised outside the accounting core.
///
/// Recording, nesting, finalizing and merging never fail; only loading
/// configuration and rendering documents can.
#[derive(Debug, Error)]
pub enum MeteringError {
    /// Configuration file could not be read.
    #[error("failed to read metering config {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Configuration is not valid TOML for [`crate::MeteringConfig`].
    #[error("failed to parse metering config {origin}: {source}")]
    Parse {
        /// File path, or `<inline>` for configuration parsed from a string.
        origin: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// Configuration parsed but holds an unusable value.
    #[error("invalid metering config: {0}")]
    InvalidConfig(String),
    /// Document serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
