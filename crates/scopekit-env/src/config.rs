//! Application configuration
//!
//! [`AppConfig`] is the configuration singleton of an environment: the merged
//! [`ConfigDocument`] plus its scope snapshot. The `load_test_*` steps layer
//! the test override file and the test cache settings over the regular
//! loading steps.

use std::path::PathBuf;

use scopekit_config::{ConfigDocument, ConfigNode, ConfigOptions, ConfigPath};
use scopekit_snapshot::{Snapshot, SnapshotManager};

use crate::bootstrap::{DbConfigSource, ModuleSource};
use crate::error::ScopeError;

/// Base configuration file in the configuration directory
pub const BASE_CONFIG_FILE: &str = "config.xml";

/// Live credentials file in the configuration directory
pub const LOCAL_CONFIG_FILE: &str = "local.xml";

/// Suffix turning the credentials file name into the override file name
pub const TEST_CONFIG_SUFFIX: &str = ".phpunit";

/// Cache directory under the runtime directory during tests
pub const TEST_CACHE_DIR: &str = "phpunit.cache";

/// Session directory under the runtime directory during tests
pub const TEST_SESSION_DIR: &str = "phpunit.session";

/// Database name of the default connection
pub const DB_NAME_PATH: &str = "global/resources/default_setup/connection/dbname";

/// Cache backend selector
pub const CACHE_BACKEND_PATH: &str = "global/cache/backend";

/// Installation date, set once the application is installed
pub const INSTALL_DATE_PATH: &str = "global/install/date";

/// Cache backend used during tests
pub const TEST_CACHE_BACKEND: &str = "file";

/// Path constant to [`ConfigPath`]
fn known_path(path: &'static str) -> ConfigPath {
    ConfigPath::new(path.split('/').map(str::to_string).collect())
}

/// Merged configuration of one environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    document: ConfigDocument,
    snapshots: SnapshotManager,
    local_config_loaded: bool,
    test_config_loaded: bool,
}

impl AppConfig {
    /// Create empty configuration with the given option bag
    #[must_use]
    pub fn new(options: ConfigOptions) -> Self {
        Self {
            document: ConfigDocument::new(options),
            snapshots: SnapshotManager::new(),
            local_config_loaded: false,
            test_config_loaded: false,
        }
    }

    /// Merged document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Option bag
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConfigOptions {
        self.document.options()
    }

    /// Node at `path`
    ///
    /// # Errors
    /// Returns error if `path` is not a valid path
    pub fn node(&self, path: &str) -> Result<Option<&ConfigNode>, ScopeError> {
        let path: ConfigPath = path.parse()?;
        Ok(self.document.node(&path))
    }

    /// Set value at `path`
    ///
    /// # Errors
    /// Returns error if `path` is not a valid path
    pub fn set_node(&mut self, path: &str, value: impl Into<String>) -> Result<(), ScopeError> {
        let path: ConfigPath = path.parse()?;
        self.document.set_node(&path, value);
        Ok(())
    }

    /// Whether the credentials file has been merged
    #[inline]
    #[must_use]
    pub fn is_local_config_loaded(&self) -> bool {
        self.local_config_loaded
    }

    /// Whether the override file has been merged
    #[inline]
    #[must_use]
    pub fn is_test_config_loaded(&self) -> bool {
        self.test_config_loaded
    }

    /// Whether the application reports an installation date
    #[must_use]
    pub fn is_installed(&self) -> bool {
        !self
            .document
            .text(&known_path(INSTALL_DATE_PATH))
            .trim()
            .is_empty()
    }

    /// Database name of the default connection, empty when unset
    #[must_use]
    pub fn db_name(&self) -> &str {
        self.document.text(&known_path(DB_NAME_PATH))
    }

    /// Location of the override file
    #[must_use]
    pub fn test_config_path(&self) -> PathBuf {
        self.options()
            .etc_dir
            .join(format!("{LOCAL_CONFIG_FILE}{TEST_CONFIG_SUFFIX}"))
    }

    /// Merge `config.xml` and `local.xml` of the configuration directory
    ///
    /// Missing files are skipped; a present `local.xml` marks the local
    /// configuration as loaded.
    ///
    /// # Errors
    /// Returns error if a present file cannot be read or parsed
    pub fn load_base(&mut self) -> Result<&mut Self, ScopeError> {
        let etc_dir = self.options().etc_dir.clone();
        self.document
            .merge_file_if_exists(&etc_dir.join(BASE_CONFIG_FILE))?;
        self.local_config_loaded = self
            .document
            .merge_file_if_exists(&etc_dir.join(LOCAL_CONFIG_FILE))?;
        tracing::debug!(
            "Loaded base configuration from {} (local: {})",
            etc_dir.display(),
            self.local_config_loaded
        );
        Ok(self)
    }

    /// Merge module configuration
    ///
    /// `local.xml` is merged again afterwards so its values stay on top.
    ///
    /// # Errors
    /// Returns error if a module configuration cannot be loaded
    pub fn load_modules(&mut self, modules: &dyn ModuleSource) -> Result<&mut Self, ScopeError> {
        let roots = modules.module_configs(self.options())?;
        tracing::debug!("Merging {} module configurations", roots.len());
        for root in &roots {
            self.document.extend_node(root, true);
        }
        if self.local_config_loaded {
            let local = self.options().etc_dir.join(LOCAL_CONFIG_FILE);
            self.document.merge_file_if_exists(&local)?;
        }
        Ok(self)
    }

    /// Merge database-sourced configuration
    ///
    /// The first call on an installed application with local configuration
    /// captures the default scope sections before anything is merged.
    ///
    /// # Errors
    /// Returns error if the stored configuration cannot be read
    pub fn load_db(&mut self, db: &dyn DbConfigSource) -> Result<&mut Self, ScopeError> {
        if self.local_config_loaded && self.is_installed() && !self.snapshots.is_captured() {
            self.snapshots.capture_default(&self.document)?;
        }
        if let Some(root) = db.load(&self.document)? {
            self.document.extend_node(&root, true);
        }
        Ok(self)
    }

    /// [`Self::load_base`] followed by the test cache settings
    ///
    /// # Errors
    /// Returns error if a present file cannot be read or parsed
    pub fn load_test_base(&mut self) -> Result<&mut Self, ScopeError> {
        self.load_base()?;
        Ok(self.apply_test_cache_config())
    }

    /// [`Self::load_modules`] followed by the override file and the test
    /// cache settings
    ///
    /// # Errors
    /// Returns [`ScopeError::ConfigurationMissing`] without the override file
    /// and [`ScopeError::UnsafeConfiguration`] if it points at the live
    /// database
    pub fn load_test_modules(
        &mut self,
        modules: &dyn ModuleSource,
    ) -> Result<&mut Self, ScopeError> {
        self.load_modules(modules)?;
        self.load_test_config()?;
        Ok(self.apply_test_cache_config())
    }

    /// Merge the override file over the current configuration
    ///
    /// # Errors
    /// Returns [`ScopeError::ConfigurationMissing`] if the file does not
    /// exist, [`ScopeError::UnsafeConfiguration`] if its database name is
    /// missing or equal to the live one
    pub fn load_test_config(&mut self) -> Result<&mut Self, ScopeError> {
        let path = self.test_config_path();
        if !path.is_file() {
            return Err(ScopeError::ConfigurationMissing { path });
        }

        let test = ConfigDocument::from_file(&path, self.options().clone())?;
        check_db_credentials(self.document.root(), test.root())?;
        self.document.extend(&test);
        self.test_config_loaded = true;

        tracing::info!("Merged test configuration from {}", path.display());
        Ok(self)
    }

    /// Point the cache at files and move cache and session storage under
    /// dedicated test directories
    pub fn apply_test_cache_config(&mut self) -> &mut Self {
        self.document
            .set_node(&known_path(CACHE_BACKEND_PATH), TEST_CACHE_BACKEND);
        let options = self.document.options_mut();
        options.cache_dir = options.var_dir.join(TEST_CACHE_DIR);
        options.session_dir = options.var_dir.join(TEST_SESSION_DIR);
        self
    }

    /// Capture `sections` of the current configuration
    ///
    /// # Errors
    /// Returns [`ScopeError::InvalidState`] if a snapshot already exists
    pub fn save_scope_snapshot(&mut self, sections: &[&str]) -> Result<&mut Self, ScopeError> {
        self.snapshots.capture(&self.document, sections)?;
        Ok(self)
    }

    /// Capture `sections`, deliberately replacing an existing snapshot
    pub fn replace_scope_snapshot(&mut self, sections: &[&str]) -> &mut Self {
        self.snapshots.recapture(&self.document, sections);
        self
    }

    /// Put the captured sections back
    ///
    /// # Errors
    /// Returns [`ScopeError::InvalidState`] if nothing was captured
    pub fn load_scope_snapshot(&mut self) -> Result<&mut Self, ScopeError> {
        self.snapshots.restore(&mut self.document)?;
        Ok(self)
    }

    /// Captured scope snapshot, if any
    #[inline]
    #[must_use]
    pub fn scope_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.snapshot()
    }
}

/// Refuse a test configuration that could reach the live database
///
/// # Errors
/// Returns [`ScopeError::UnsafeConfiguration`] if the test database name is
/// missing or empty, or equal to the live one
pub fn check_db_credentials(live: &ConfigNode, test: &ConfigNode) -> Result<(), ScopeError> {
    let path = known_path(DB_NAME_PATH);
    let live_name = live.descend(&path).map_or("", ConfigNode::text).trim();
    let test_name = test.descend(&path).map_or("", ConfigNode::text).trim();

    if test_name.is_empty() {
        return Err(ScopeError::UnsafeConfiguration {
            db_name: String::new(),
            reason: "is not set in the test configuration",
        });
    }
    if test_name == live_name {
        return Err(ScopeError::UnsafeConfiguration {
            db_name: test_name.to_string(),
            reason: "is the live database",
        });
    }
    Ok(())
}
