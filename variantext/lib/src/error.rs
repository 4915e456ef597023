//! Error types for variant processing.
//!
//! Markers are plain user-authored text, so malformed markers and unknown
//! labels are never errors. The only failures come from configuration: a bad
//! root selector, an unusable sentinel, or a config file that cannot be read.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or running the variant processor.
#[derive(Error, Debug)]
pub enum VariantError {
    /// The CSS selector used to locate the content root is invalid.
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    /// A label contains characters outside `[A-Za-z0-9.]`.
    #[error("Invalid variant label: {0:?}")]
    InvalidLabel(String),

    /// The marker sentinel is empty.
    #[error("Invalid marker sentinel: {0:?}")]
    InvalidSentinel(String),

    /// A palette entry is empty.
    #[error("Palette entry {index} is empty")]
    EmptyPaletteEntry {
        /// Position of the offending entry.
        index: usize,
    },

    /// The YAML configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A file could not be read.
    #[error("Failed to read `{path}`: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for variant operations.
pub type VariantResult<T> = Result<T, VariantError>;
