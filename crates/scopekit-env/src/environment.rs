//! Environment context
//!
//! An [`Environment`] bundles everything a process-wide application would
//! keep in globals: application state, configuration, event observers and
//! the registry. A [`ScopeHolder`] owns the environment currently in use and
//! is the only place it can be swapped.

use scopekit_config::ConfigOptions;
use serde_json::Value;

use crate::app::Application;
use crate::bootstrap::Bootstrap;
use crate::config::AppConfig;
use crate::error::ScopeError;
use crate::events::{Event, EventBus};
use crate::registry::Registry;

/// Which configuration an environment was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Regular configuration
    Live,
    /// Test override configuration
    Test,
}

impl ScopeKind {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
        }
    }
}

/// Application, configuration, observers and registry of one scope
#[derive(Debug)]
pub struct Environment {
    kind: ScopeKind,
    application: Application,
    config: AppConfig,
    events: EventBus,
    registry: Registry,
}

impl Environment {
    /// Wrap an already loaded live configuration
    #[must_use]
    pub fn live(config: AppConfig) -> Self {
        Self {
            kind: ScopeKind::Live,
            application: Application::new(),
            config,
            events: EventBus::new(),
            registry: Registry::new(),
        }
    }

    /// Build a fresh test environment from `options`
    ///
    /// # Errors
    /// Returns error if the test bootstrap fails
    pub fn test(options: ConfigOptions, bootstrap: &mut Bootstrap) -> Result<Self, ScopeError> {
        let mut config = AppConfig::new(options);
        let mut application = Application::new();
        application.init_test(&mut config, bootstrap)?;

        Ok(Self {
            kind: ScopeKind::Test,
            application,
            config,
            events: EventBus::new(),
            registry: Registry::new(),
        })
    }

    /// Scope kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Whether this is a test environment
    #[inline]
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.kind == ScopeKind::Test
    }

    /// Application state
    #[inline]
    #[must_use]
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Mutable application state
    #[inline]
    pub fn application_mut(&mut self) -> &mut Application {
        &mut self.application
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable configuration
    #[inline]
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Event observers
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Mutable event observers
    #[inline]
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable registry
    #[inline]
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Dispatch `name` to its observers; returns how many ran
    ///
    /// Nothing runs while event dispatch is disabled.
    pub fn dispatch_event(&mut self, name: &str, args: Value) -> usize {
        if !self.application.events_enabled() {
            tracing::trace!("Skipping event {} while dispatch is disabled", name);
            return 0;
        }
        self.events.dispatch(&Event::new(name, args))
    }
}

/// Owner of the environment currently in use
#[derive(Debug)]
pub struct ScopeHolder {
    current: Environment,
}

impl ScopeHolder {
    /// Hold `env`
    #[inline]
    #[must_use]
    pub fn new(env: Environment) -> Self {
        Self { current: env }
    }

    /// Environment in use
    #[inline]
    #[must_use]
    pub fn current(&self) -> &Environment {
        &self.current
    }

    /// Mutable environment in use
    #[inline]
    pub fn current_mut(&mut self) -> &mut Environment {
        &mut self.current
    }

    /// Put `env` in use and return the previous one
    pub fn replace(&mut self, env: Environment) -> Environment {
        tracing::debug!(
            "Switching environment from {} to {}",
            self.current.kind.as_str(),
            env.kind.as_str()
        );
        std::mem::replace(&mut self.current, env)
    }

    /// Release the held environment
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Environment {
        self.current
    }
}
