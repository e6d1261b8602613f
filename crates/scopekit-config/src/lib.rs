//! scopekit configuration trees
//!
//! Hierarchical, XML-shaped configuration with deterministic deep-merge.
//!
//! # Core Concepts
//!
//! - [`ConfigNode`]: named node with optional value, attributes and children
//! - [`ConfigPath`]: `/`-separated addressing (`global/cache/backend`)
//! - [`ConfigDocument`]: root node plus [`ConfigOptions`] option bag
//! - [`ConfigNode::extend`]: recursive merge, leaves of the source win when
//!   overwriting is requested
//!
//! # Example
//!
//! ```rust
//! use scopekit_config::{ConfigDocument, ConfigOptions, ConfigPath};
//!
//! let mut live = ConfigDocument::parse(
//!     "<config><global><cache><backend>database</backend></cache></global></config>",
//!     ConfigOptions::default(),
//! )?;
//! let test = ConfigDocument::parse(
//!     "<config><global><cache><backend>file</backend></cache></global></config>",
//!     ConfigOptions::default(),
//! )?;
//! live.extend(&test);
//!
//! let backend: ConfigPath = "global/cache/backend".parse()?;
//! assert_eq!(live.text(&backend), "file");
//! # Ok::<(), scopekit_config::ConfigError>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod document;
mod error;
mod node;
mod path;

pub mod xml;

// Re-exports
pub use document::{ConfigDocument, ConfigOptions, ROOT_NODE_NAME};
pub use error::ConfigError;
pub use node::ConfigNode;
pub use path::{is_valid_name, ConfigPath};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
