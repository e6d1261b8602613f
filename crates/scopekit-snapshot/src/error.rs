//! Error types for scope snapshots

/// Snapshot lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Operation not valid in the current lifecycle state
    #[error("invalid snapshot state: {0}")]
    InvalidState(&'static str),

    /// A snapshot exists and would be overwritten
    #[error("scope snapshot already captured for sections {sections:?}")]
    AlreadyCaptured {
        /// Sections held by the existing snapshot
        sections: Vec<String>,
    },
}

impl SnapshotError {
    /// Check if error is a lifecycle violation
    #[inline]
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}
