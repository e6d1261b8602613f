//! Scoped switch to the test environment
//!
//! [`TestScope`] swaps a freshly built test [`Environment`] into a
//! [`ScopeHolder`] and puts the live one back when it is left or dropped.
//! The guard holds the holder mutably, so a second scope cannot be entered
//! while one is active.

use scopekit_config::ConfigOptions;

use crate::bootstrap::Bootstrap;
use crate::environment::{Environment, ScopeHolder};
use crate::error::ScopeError;

/// Active test scope over a [`ScopeHolder`]
#[derive(Debug)]
#[must_use = "the live environment is restored as soon as the scope is dropped"]
pub struct TestScope<'a> {
    holder: &'a mut ScopeHolder,
    live: Option<Environment>,
}

impl<'a> TestScope<'a> {
    /// Build a test environment from `options` and put it in use
    ///
    /// The test environment is fully initialised before the swap; on error
    /// `holder` still holds the live environment, unchanged.
    ///
    /// # Errors
    /// Returns [`ScopeError::ConfigurationMissing`] without an override file,
    /// [`ScopeError::UnsafeConfiguration`] if it names the live database, or
    /// any bootstrap failure
    pub fn enter(
        holder: &'a mut ScopeHolder,
        options: ConfigOptions,
        bootstrap: &mut Bootstrap,
    ) -> Result<Self, ScopeError> {
        if holder.current().is_test() {
            return Err(ScopeError::InvalidState(
                "holder already runs a test environment".to_string(),
            ));
        }

        let test = Environment::test(options, bootstrap)?;
        let live = holder.replace(test);
        tracing::info!("Entered test scope");

        Ok(Self {
            holder,
            live: Some(live),
        })
    }

    /// Test environment in use
    #[inline]
    #[must_use]
    pub fn env(&self) -> &Environment {
        self.holder.current()
    }

    /// Mutable test environment in use
    #[inline]
    pub fn env_mut(&mut self) -> &mut Environment {
        self.holder.current_mut()
    }

    /// Live environment parked for the duration of the scope
    #[inline]
    #[must_use]
    pub fn live(&self) -> Option<&Environment> {
        self.live.as_ref()
    }

    /// Turn event dispatch of the test environment on or off
    pub fn set_event_dispatch_enabled(&mut self, enabled: bool) -> &mut Self {
        self.env_mut()
            .application_mut()
            .set_events_enabled(enabled);
        self
    }

    /// Roll the scope sections of the test configuration back to their
    /// captured state
    ///
    /// # Errors
    /// Returns [`ScopeError::InvalidState`] if nothing was captured
    pub fn restore_scope_snapshot(&mut self) -> Result<&mut Self, ScopeError> {
        self.env_mut().config_mut().load_scope_snapshot()?;
        Ok(self)
    }

    /// Put the live environment back and return the test one
    pub fn leave(mut self) -> Environment {
        match self.restore_live() {
            Some(test) => test,
            // `live` is only taken here or in `drop`, both consume the guard
            None => unreachable!("test scope left twice"),
        }
    }

    fn restore_live(&mut self) -> Option<Environment> {
        let live = self.live.take()?;
        let test = self.holder.replace(live);
        tracing::info!("Left test scope");
        Some(test)
    }
}

impl Drop for TestScope<'_> {
    fn drop(&mut self) {
        if self.live.is_some() {
            tracing::warn!("Test scope dropped without leaving; restoring live environment");
            self.restore_live();
        }
    }
}
