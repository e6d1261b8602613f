//! Application object
//!
//! Holds the per-environment runtime state next to the configuration: the
//! current store, the cache and the event switch. [`Application::init_test`]
//! is the test bootstrap sequence.

use std::fmt;
use std::str::FromStr;

use crate::bootstrap::Bootstrap;
use crate::cache::FileCache;
use crate::config::AppConfig;
use crate::error::ScopeError;

/// Store code of the administration area
pub const ADMIN_STORE_CODE: &str = "admin";

/// Kind of scope a store code names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunType {
    /// A single store view
    #[default]
    Store,
    /// A website and its default store
    Website,
    /// A store group and its default store
    Group,
}

impl RunType {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Website => "website",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunType {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Self::Store),
            "website" => Ok(Self::Website),
            "group" => Ok(Self::Group),
            other => Err(ScopeError::InvalidState(format!("unknown run type: {other}"))),
        }
    }
}

/// Store the application runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreScope {
    /// Store, website or group code
    pub code: String,
    /// What `code` names
    pub run_type: RunType,
}

impl StoreScope {
    /// Create scope
    #[inline]
    #[must_use]
    pub fn new(code: impl Into<String>, run_type: RunType) -> Self {
        Self {
            code: code.into(),
            run_type,
        }
    }

    /// Administration store
    #[inline]
    #[must_use]
    pub fn admin() -> Self {
        Self::new(ADMIN_STORE_CODE, RunType::Store)
    }
}

/// Runtime state of one environment
#[derive(Debug, Clone)]
pub struct Application {
    current_store: Option<StoreScope>,
    cache: Option<FileCache>,
    events_enabled: bool,
    data_updates_applied: bool,
}

impl Application {
    /// Create application with events enabled and nothing initialised
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_store: None,
            cache: None,
            events_enabled: true,
            data_updates_applied: false,
        }
    }

    /// Run the test bootstrap against `config`
    ///
    /// Order: base files with test cache settings, modules with the override
    /// file, a clean cache, schema upgrades, database configuration, then
    /// the administration store and data upgrades. Upgrades only run when
    /// local configuration is present.
    ///
    /// # Errors
    /// Returns the first failing step; the override file must exist and must
    /// not name the live database
    pub fn init_test(
        &mut self,
        config: &mut AppConfig,
        bootstrap: &mut Bootstrap,
    ) -> Result<(), ScopeError> {
        config.load_test_base()?;
        config.load_test_modules(bootstrap.modules.as_ref())?;

        // Only touch the cache directory once the override file is accepted
        let cache = FileCache::for_test(&config.options().cache_dir);
        cache.clean()?;
        self.cache = Some(cache);

        if config.is_local_config_loaded() {
            bootstrap.setup.apply_all_updates(config)?;
        }

        config.load_db(bootstrap.db.as_ref())?;

        if config.is_local_config_loaded() {
            self.set_current_store(StoreScope::admin());
            bootstrap.setup.apply_all_data_updates(config)?;
            self.data_updates_applied = true;
        }

        tracing::debug!(
            "Test application initialised (store: {:?})",
            self.current_store.as_ref().map(|s| s.code.as_str())
        );
        Ok(())
    }

    /// Current store, if one was selected
    #[inline]
    #[must_use]
    pub fn current_store(&self) -> Option<&StoreScope> {
        self.current_store.as_ref()
    }

    /// Select the current store
    #[inline]
    pub fn set_current_store(&mut self, store: StoreScope) {
        self.current_store = Some(store);
    }

    /// Cache created during initialisation
    #[inline]
    #[must_use]
    pub fn cache(&self) -> Option<&FileCache> {
        self.cache.as_ref()
    }

    /// Whether data upgrades ran during initialisation
    #[inline]
    #[must_use]
    pub fn data_updates_applied(&self) -> bool {
        self.data_updates_applied
    }

    /// Whether events reach observers
    #[inline]
    #[must_use]
    pub fn events_enabled(&self) -> bool {
        self.events_enabled
    }

    /// Turn event dispatch on
    #[inline]
    pub fn enable_events(&mut self) -> &mut Self {
        self.set_events_enabled(true)
    }

    /// Turn event dispatch off
    #[inline]
    pub fn disable_events(&mut self) -> &mut Self {
        self.set_events_enabled(false)
    }

    /// Set event dispatch
    pub fn set_events_enabled(&mut self, enabled: bool) -> &mut Self {
        if self.events_enabled != enabled {
            tracing::debug!("Event dispatch {}", if enabled { "enabled" } else { "disabled" });
        }
        self.events_enabled = enabled;
        self
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
