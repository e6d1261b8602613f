//! Error types for scope switching
//!
//! Every failure raised while building or leaving a test scope is fatal for
//! the test run: nothing here is retried.

use std::path::PathBuf;

use scopekit_config::ConfigError;
use scopekit_snapshot::SnapshotError;

/// Main scope error type
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// A required configuration file does not exist
    #[error("required configuration file is missing: {}", path.display())]
    ConfigurationMissing {
        /// Expected location
        path: PathBuf,
    },

    /// Operation not valid in the current lifecycle state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Test configuration could reach live data
    #[error("unsafe test configuration: database '{db_name}' {reason}")]
    UnsafeConfiguration {
        /// Database name found in the test configuration, empty when unset
        db_name: String,
        /// Why the name was refused
        reason: &'static str,
    },

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Cache storage failed
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Registry misuse
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A bootstrap collaborator failed
    #[error("setup failed: {0}")]
    Setup(String),
}

impl ScopeError {
    /// Check if a required file was missing
    #[inline]
    #[must_use]
    pub fn is_configuration_missing(&self) -> bool {
        matches!(self, Self::ConfigurationMissing { .. })
    }

    /// Check if error is a lifecycle violation
    #[inline]
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if the test configuration was refused as unsafe
    #[inline]
    #[must_use]
    pub fn is_unsafe(&self) -> bool {
        matches!(self, Self::UnsafeConfiguration { .. })
    }

    /// Check if error aborts the test run
    ///
    /// Missing configuration, lifecycle violations and unsafe configuration
    /// are never retried.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing { .. }
                | Self::InvalidState(_)
                | Self::UnsafeConfiguration { .. }
        )
    }
}

impl From<SnapshotError> for ScopeError {
    fn from(err: SnapshotError) -> Self {
        Self::InvalidState(err.to_string())
    }
}

/// File cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filesystem access failed
    #[error("cannot access cache entry {}: {source}", path.display())]
    Io {
        /// Entry or directory involved
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Key registered twice
    #[error("registry key already exists: {0}")]
    KeyExists(String),
}
