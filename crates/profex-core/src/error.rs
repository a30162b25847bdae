//! Error types for the profex-core library.
//!
//! Field extraction itself is total: a heuristic that finds nothing
//! yields an empty value with confidence 0.0, never an error. The
//! variants here cover the surrounding machinery only (configuration
//! file I/O and pattern-table compilation).

use thiserror::Error;

/// Main error type for the profex library.
#[derive(Error, Debug)]
pub enum ProfexError {
    /// A configured pattern table could not be compiled into a regex.
    #[error("invalid pattern table: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration or block JSON could not be (de)serialized.
    #[error("invalid JSON input: {0}")]
    Input(#[from] serde_json::Error),

    /// I/O error reading or writing a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the profex library.
pub type Result<T> = std::result::Result<T, ProfexError>;
