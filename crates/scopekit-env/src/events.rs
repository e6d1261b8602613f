//! Event bus
//!
//! Observers subscribe by event name; names are case-insensitive.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Dispatched event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    args: Value,
}

impl Event {
    /// Create event; the name is normalised to lower case
    #[inline]
    #[must_use]
    pub fn new(name: &str, args: Value) -> Self {
        Self {
            name: name.to_lowercase(),
            args,
        }
    }

    /// Event name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event arguments
    #[inline]
    #[must_use]
    pub fn args(&self) -> &Value {
        &self.args
    }
}

/// Observer callback
pub type ObserverFn = Box<dyn FnMut(&Event)>;

struct Observer {
    name: String,
    callback: ObserverFn,
}

/// Event name to observers
#[derive(Default)]
pub struct EventBus {
    observers: HashMap<String, Vec<Observer>>,
}

impl EventBus {
    /// Create bus without observers
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` under `observer` to `event`
    ///
    /// An observer already registered under the same name is replaced.
    pub fn subscribe(
        &mut self,
        event: &str,
        observer: &str,
        callback: impl FnMut(&Event) + 'static,
    ) {
        let list = self.observers.entry(event.to_lowercase()).or_default();
        let entry = Observer {
            name: observer.to_string(),
            callback: Box::new(callback),
        };
        match list.iter_mut().find(|o| o.name == observer) {
            Some(existing) => *existing = entry,
            None => list.push(entry),
        }
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, event: &str, observer: &str) -> bool {
        let Some(list) = self.observers.get_mut(&event.to_lowercase()) else {
            return false;
        };
        let before = list.len();
        list.retain(|o| o.name != observer);
        before != list.len()
    }

    /// Observer names for `event` in subscription order
    #[must_use]
    pub fn observer_names(&self, event: &str) -> Vec<&str> {
        self.observers
            .get(&event.to_lowercase())
            .map(|list| list.iter().map(|o| o.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Invoke every observer of the event; returns how many ran
    pub fn dispatch(&mut self, event: &Event) -> usize {
        let Some(list) = self.observers.get_mut(event.name()) else {
            return 0;
        };
        for observer in list.iter_mut() {
            tracing::trace!("Dispatching {} to {}", event.name(), observer.name);
            (observer.callback)(event);
        }
        list.len()
    }

    /// Total number of subscriptions
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    /// Whether nothing is subscribed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event, list) in &self.observers {
            let names: Vec<&str> = list.iter().map(|o| o.name.as_str()).collect();
            map.entry(event, &names);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_reaches_observers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&seen);
        bus.subscribe("catalog_product_save_after", "indexer", move |e| {
            first.borrow_mut().push(format!("indexer:{}", e.args()["id"]));
        });
        let second = Rc::clone(&seen);
        bus.subscribe("catalog_product_save_after", "cache", move |_| {
            second.borrow_mut().push("cache".to_string());
        });

        let ran = bus.dispatch(&Event::new("catalog_product_save_after", json!({"id": 7})));

        assert_eq!(ran, 2);
        assert_eq!(*seen.borrow(), vec!["indexer:7", "cache"]);
    }

    #[test]
    fn names_are_case_insensitive() {
        let mut bus = EventBus::new();
        bus.subscribe("Customer_Login", "audit", |_| {});

        assert_eq!(bus.observer_names("customer_login"), vec!["audit"]);
        assert_eq!(bus.dispatch(&Event::new("CUSTOMER_LOGIN", Value::Null)), 1);
    }

    #[test]
    fn subscribe_replaces_same_observer() {
        let mut bus = EventBus::new();
        bus.subscribe("a", "one", |_| {});
        bus.subscribe("a", "one", |_| {});
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn unsubscribe_and_unknown_events() {
        let mut bus = EventBus::new();
        bus.subscribe("a", "one", |_| {});

        assert!(bus.unsubscribe("a", "one"));
        assert!(!bus.unsubscribe("a", "one"));
        assert!(!bus.unsubscribe("b", "one"));
        assert_eq!(bus.dispatch(&Event::new("a", Value::Null)), 0);
        assert!(bus.is_empty());
    }
}
