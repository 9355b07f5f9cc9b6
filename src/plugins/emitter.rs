//! Event emitter - named events with ordered listeners
//!
//! Built once at start-up and shared by reference (or `Arc`) with every
//! component that registers or emits. Listeners are only ever added.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::application::errors::{PluginError, PluginResult};

/// Arguments handed to every listener
pub type EventArgs = serde_json::Value;

/// Listener function type
pub type Listener = Arc<dyn Fn(&EventArgs) + Send + Sync>;

/// Registry of event listeners
pub struct EventEmitter {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Register a listener for `event`. Registering the same listener again adds it again.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> PluginResult<Listener>
    where
        F: Fn(&EventArgs) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.add_listener(event, listener.clone())?;
        Ok(listener)
    }

    /// Register an already shared listener
    pub fn add_listener(&self, event: impl Into<String>, listener: Listener) -> PluginResult<()> {
        let event = event.into();
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))?;

        tracing::debug!("Adding listener for event: {}", event);
        listeners.entry(event).or_default().push(listener);
        Ok(())
    }

    /// Call every listener for `event` in registration order.
    ///
    /// Returns the number of listeners called.
    pub fn emit(&self, event: &str, args: &EventArgs) -> usize {
        // Listeners may register further listeners, so call them outside the lock
        let targets: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners.get(event).cloned().unwrap_or_default(),
            Err(_) => {
                tracing::error!("Listener registry poisoned, dropping event: {}", event);
                return 0;
            }
        };

        tracing::debug!("Emitting {} to {} listener(s)", event, targets.len());
        for listener in &targets {
            listener(args);
        }
        targets.len()
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .ok()
            .and_then(|l| l.get(event).map(Vec::len))
            .unwrap_or(0)
    }

    /// Names of all events with at least one listener
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .listeners
            .read()
            .ok()
            .map(|l| l.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.event_names())
            .finish()
    }
}
