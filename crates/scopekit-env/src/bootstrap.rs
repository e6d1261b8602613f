//! Collaborators of the test bootstrap
//!
//! Module configuration, database-sourced configuration and setup scripts
//! belong to the host application. They are reached through the traits here
//! and bundled in a [`Bootstrap`].

use std::fs;
use std::path::PathBuf;

use scopekit_config::{ConfigDocument, ConfigNode, ConfigOptions};

use crate::config::AppConfig;
use crate::error::ScopeError;

/// Supplier of module configuration trees
pub trait ModuleSource {
    /// Module configuration roots, in merge order
    ///
    /// # Errors
    /// Returns error if a module configuration cannot be loaded
    fn module_configs(&self, options: &ConfigOptions) -> Result<Vec<ConfigNode>, ScopeError>;
}

/// Supplier of configuration stored in the database
pub trait DbConfigSource {
    /// Root holding the database-sourced sections, if any
    ///
    /// # Errors
    /// Returns error if the stored configuration cannot be read
    fn load(&self, config: &ConfigDocument) -> Result<Option<ConfigNode>, ScopeError>;
}

/// Runner of pending schema and data upgrade scripts
pub trait SetupRunner {
    /// Apply pending schema upgrades
    ///
    /// # Errors
    /// Returns error if an upgrade fails
    fn apply_all_updates(&mut self, config: &AppConfig) -> Result<(), ScopeError>;

    /// Apply pending data upgrades
    ///
    /// # Errors
    /// Returns error if an upgrade fails
    fn apply_all_data_updates(&mut self, config: &AppConfig) -> Result<(), ScopeError>;
}

/// No module configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModules;

impl ModuleSource for NoModules {
    fn module_configs(&self, _options: &ConfigOptions) -> Result<Vec<ConfigNode>, ScopeError> {
        Ok(Vec::new())
    }
}

/// Fixed list of module configuration roots
#[derive(Debug, Clone, Default)]
pub struct StaticModules(pub Vec<ConfigNode>);

impl ModuleSource for StaticModules {
    fn module_configs(&self, _options: &ConfigOptions) -> Result<Vec<ConfigNode>, ScopeError> {
        Ok(self.0.clone())
    }
}

/// Every `*.xml` file of a directory, in file name order
///
/// Defaults to `etc/modules` of the options when no directory is set.
#[derive(Debug, Clone, Default)]
pub struct ModuleDirectory {
    dir: Option<PathBuf>,
}

impl ModuleDirectory {
    /// Read `etc/modules` of the configured options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Read an explicit directory
    #[inline]
    #[must_use]
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

impl ModuleSource for ModuleDirectory {
    fn module_configs(&self, options: &ConfigOptions) -> Result<Vec<ConfigNode>, ScopeError> {
        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| options.etc_dir.join("modules"));
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(|source| scopekit_config::ConfigError::Io {
                path: dir.clone(),
                source,
            })?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
            .collect();
        files.sort();

        files
            .iter()
            .map(|path| {
                tracing::debug!("Loading module configuration {}", path.display());
                ConfigDocument::from_file(path, options.clone())
                    .map(|doc| doc.root().clone())
                    .map_err(ScopeError::from)
            })
            .collect()
    }
}

/// No database-sourced configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDbConfig;

impl DbConfigSource for NoDbConfig {
    fn load(&self, _config: &ConfigDocument) -> Result<Option<ConfigNode>, ScopeError> {
        Ok(None)
    }
}

/// Fixed database-sourced configuration
#[derive(Debug, Clone)]
pub struct StaticDbConfig(pub ConfigNode);

impl DbConfigSource for StaticDbConfig {
    fn load(&self, _config: &ConfigDocument) -> Result<Option<ConfigNode>, ScopeError> {
        Ok(Some(self.0.clone()))
    }
}

/// Setup runner with nothing to apply
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSetup;

impl SetupRunner for NoopSetup {
    fn apply_all_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        Ok(())
    }

    fn apply_all_data_updates(&mut self, _config: &AppConfig) -> Result<(), ScopeError> {
        Ok(())
    }
}

/// Collaborators used while initialising a test environment
pub struct Bootstrap {
    /// Module configuration supplier
    pub modules: Box<dyn ModuleSource>,
    /// Database-sourced configuration supplier
    pub db: Box<dyn DbConfigSource>,
    /// Upgrade script runner
    pub setup: Box<dyn SetupRunner>,
}

impl Bootstrap {
    /// Create bootstrap with no modules, no stored configuration and no
    /// upgrades
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With module supplier
    #[inline]
    #[must_use]
    pub fn with_modules(mut self, modules: impl ModuleSource + 'static) -> Self {
        self.modules = Box::new(modules);
        self
    }

    /// With database-sourced configuration
    #[inline]
    #[must_use]
    pub fn with_db(mut self, db: impl DbConfigSource + 'static) -> Self {
        self.db = Box::new(db);
        self
    }

    /// With upgrade runner
    #[inline]
    #[must_use]
    pub fn with_setup(mut self, setup: impl SetupRunner + 'static) -> Self {
        self.setup = Box::new(setup);
        self
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            modules: Box::new(NoModules),
            db: Box::new(NoDbConfig),
            setup: Box::new(NoopSetup),
        }
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap").finish_non_exhaustive()
    }
}
