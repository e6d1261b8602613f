//! Detached copies of configuration scope sections
//!
//! Provides [`Snapshot`], an owned copy of selected top-level sections of a
//! [`ConfigDocument`].

use scopekit_config::{ConfigDocument, ConfigNode};

/// Sections captured when the caller does not name any
pub const DEFAULT_SCOPE_SECTIONS: [&str; 3] = ["default", "websites", "stores"];

/// Owned copy of named top-level sections
///
/// A snapshot is a value: once captured it never observes later changes to
/// the document it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    document: ConfigDocument,
}

impl Snapshot {
    /// Copy `sections` out of `live`
    ///
    /// A section missing from `live` is recorded as an empty placeholder, so
    /// restoring it later yields an empty section.
    #[must_use]
    pub fn capture(live: &ConfigDocument, sections: &[&str]) -> Self {
        let mut document = ConfigDocument::new(live.options().clone());
        let root = document.root_mut();

        for &name in sections {
            let section = live
                .root()
                .child(name)
                .cloned()
                .unwrap_or_else(|| ConfigNode::new(name));
            root.add_child(section);
        }

        Self { document }
    }

    /// Copy the default scope sections out of `live`
    #[inline]
    #[must_use]
    pub fn capture_default(live: &ConfigDocument) -> Self {
        Self::capture(live, &DEFAULT_SCOPE_SECTIONS)
    }

    /// Replace each captured section of `live` with the captured copy
    ///
    /// Every section is swapped as a whole subtree: whatever was merged into
    /// it after capture is dropped. Restored sections move to the end of the
    /// root in capture order; sections not in the snapshot are left alone.
    pub fn restore_into(&self, live: &mut ConfigDocument) {
        let root = live.root_mut();
        for section in self.document.root().children() {
            root.remove_child(section.name());
            root.add_child(section.clone());
        }
    }

    /// Captured section names in capture order
    #[inline]
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.document.root().child_names()
    }

    /// Captured copy of one section
    #[inline]
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&ConfigNode> {
        self.document.root().child(name)
    }

    /// Detached document holding the captured sections
    #[inline]
    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }
}
