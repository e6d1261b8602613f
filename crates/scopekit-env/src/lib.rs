//! scopekit test environments
//!
//! Switches an application between its live environment and an isolated
//! test environment built from `local.xml.phpunit`.
//!
//! # Core Concepts
//!
//! - [`Environment`]: application state, configuration, observers and
//!   registry of one scope
//! - [`ScopeHolder`]: owner of the environment in use
//! - [`TestScope`]: guard that swaps a test environment in and the live one
//!   back out
//! - [`AppConfig`]: merged configuration with override loading, the database
//!   safety check and the scope snapshot
//! - [`Bootstrap`]: host collaborators (modules, stored configuration,
//!   upgrades)
//!
//! # Example
//!
//! ```rust
//! use scopekit_config::ConfigOptions;
//! use scopekit_env::{AppConfig, Bootstrap, Environment, ScopeHolder, TestScope};
//!
//! let dir = tempfile::tempdir()?;
//! let options = ConfigOptions::new(dir.path());
//! std::fs::create_dir_all(&options.etc_dir)?;
//! std::fs::write(
//!     options.etc_dir.join("local.xml.phpunit"),
//!     "<config><global><resources><default_setup><connection>\
//!      <dbname>shop_test</dbname>\
//!      </connection></default_setup></resources></global></config>",
//! )?;
//!
//! let mut holder = ScopeHolder::new(Environment::live(AppConfig::new(options.clone())));
//! let scope = TestScope::enter(&mut holder, options, &mut Bootstrap::new())?;
//! assert_eq!(scope.env().config().db_name(), "shop_test");
//! scope.leave();
//!
//! assert!(!holder.current().is_test());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod app;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod logging;
pub mod registry;
pub mod scope;

// Re-exports
pub use app::{Application, RunType, StoreScope, ADMIN_STORE_CODE};
pub use bootstrap::{
    Bootstrap, DbConfigSource, ModuleDirectory, ModuleSource, NoDbConfig, NoModules, NoopSetup,
    SetupRunner, StaticDbConfig, StaticModules,
};
pub use cache::{FileCache, TEST_CACHE_KINDS};
pub use config::{check_db_credentials, AppConfig};
pub use environment::{Environment, ScopeHolder, ScopeKind};
pub use error::{CacheError, RegistryError, ScopeError};
pub use events::{Event, EventBus};
pub use logging::init_tracing;
pub use registry::Registry;
pub use scope::TestScope;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
