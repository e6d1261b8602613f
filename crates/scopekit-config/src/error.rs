//! Error types for configuration trees

use std::path::PathBuf;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing a configuration file failed
    #[error("cannot access {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Markup could not be parsed or written
    #[error("malformed configuration markup: {0}")]
    Xml(String),

    /// Markup contained no root element
    #[error("configuration document has no root element")]
    EmptyDocument,

    /// Path string could not be parsed
    #[error("invalid configuration path '{path}': {reason}")]
    InvalidPath {
        /// Offending path text
        path: String,
        /// What was wrong with it
        reason: String,
    },
}

impl ConfigError {
    /// Wrap any markup-layer failure
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }

    /// Check if the error came from the filesystem
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
