//! Snapshot lifecycle for one configuration document
//!
//! Provides [`SnapshotManager`], which holds at most one [`Snapshot`] and
//! guards capture and restore.

use scopekit_config::ConfigDocument;

use crate::error::SnapshotError;
use crate::snapshot::{Snapshot, DEFAULT_SCOPE_SECTIONS};

/// Holder of the scope snapshot of one document instance
#[derive(Debug, Clone, Default)]
pub struct SnapshotManager {
    snapshot: Option<Snapshot>,
}

impl SnapshotManager {
    /// Create manager with nothing captured
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { snapshot: None }
    }

    /// Whether a snapshot has been captured
    #[inline]
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Captured snapshot, if any
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Capture `sections` of `live`
    ///
    /// # Errors
    /// Returns [`SnapshotError::AlreadyCaptured`] if a snapshot exists; use
    /// [`Self::recapture`] to replace it deliberately.
    pub fn capture(
        &mut self,
        live: &ConfigDocument,
        sections: &[&str],
    ) -> Result<&Snapshot, SnapshotError> {
        if let Some(existing) = &self.snapshot {
            return Err(SnapshotError::AlreadyCaptured {
                sections: existing.sections().map(str::to_string).collect(),
            });
        }
        Ok(self.store(Snapshot::capture(live, sections)))
    }

    /// Capture the default scope sections of `live`
    ///
    /// # Errors
    /// Returns [`SnapshotError::AlreadyCaptured`] if a snapshot exists
    #[inline]
    pub fn capture_default(&mut self, live: &ConfigDocument) -> Result<&Snapshot, SnapshotError> {
        self.capture(live, &DEFAULT_SCOPE_SECTIONS)
    }

    /// Capture `sections` of `live`, replacing any previous snapshot
    pub fn recapture(&mut self, live: &ConfigDocument, sections: &[&str]) -> &Snapshot {
        if self.snapshot.is_some() {
            tracing::debug!("Replacing existing scope snapshot");
        }
        self.store(Snapshot::capture(live, sections))
    }

    /// Restore the captured sections into `live`
    ///
    /// # Errors
    /// Returns [`SnapshotError::InvalidState`] if nothing was captured
    pub fn restore(&self, live: &mut ConfigDocument) -> Result<(), SnapshotError> {
        let snapshot = self.snapshot.as_ref().ok_or(SnapshotError::InvalidState(
            "cannot restore scope snapshot because none was captured",
        ))?;
        snapshot.restore_into(live);
        tracing::debug!(
            "Restored scope snapshot sections: {:?}",
            snapshot.sections().collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Drop the captured snapshot, returning it
    #[inline]
    pub fn discard(&mut self) -> Option<Snapshot> {
        self.snapshot.take()
    }

    fn store(&mut self, snapshot: Snapshot) -> &Snapshot {
        tracing::debug!(
            "Captured scope snapshot sections: {:?}",
            snapshot.sections().collect::<Vec<_>>()
        );
        self.snapshot.insert(snapshot)
    }
}
