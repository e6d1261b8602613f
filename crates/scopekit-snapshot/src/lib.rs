//! scopekit scope snapshots
//!
//! Captures the scope sections of a configuration document before
//! environment-specific values are merged in, and puts them back on demand.
//!
//! # Core Concepts
//!
//! - [`Snapshot`]: detached copy of named top-level sections
//! - [`SnapshotManager`]: at most one snapshot per document, guarded capture
//!   and restore
//! - [`DEFAULT_SCOPE_SECTIONS`]: `default`, `websites`, `stores`
//!
//! # Example
//!
//! ```rust
//! use scopekit_config::{ConfigDocument, ConfigOptions, ConfigPath};
//! use scopekit_snapshot::SnapshotManager;
//!
//! let mut live = ConfigDocument::parse(
//!     "<config><default><cache><backend>database</backend></cache></default></config>",
//!     ConfigOptions::default(),
//! )?;
//! let backend: ConfigPath = "default/cache/backend".parse()?;
//!
//! let mut manager = SnapshotManager::new();
//! manager.capture_default(&live)?;
//!
//! live.set_node(&backend, "file");
//! manager.restore(&mut live)?;
//! assert_eq!(live.text(&backend), "database");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod manager;
mod snapshot;

// Re-exports
pub use error::SnapshotError;
pub use manager::SnapshotManager;
pub use snapshot::{Snapshot, DEFAULT_SCOPE_SECTIONS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
