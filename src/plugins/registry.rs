//! Registered actions - dispatch tables built from plugin metadata

use std::collections::HashMap;

use regex::Regex;

use crate::application::messaging::context::Handler;

/// A handler triggered by a message pattern
#[derive(Clone)]
pub struct MessageHandler {
    pub plugin: String,
    /// `Plugin.method`
    pub fq_name: String,
    pub regex: Regex,
    pub handler: Handler,
}

/// A handler triggered by a platform event type
#[derive(Clone)]
pub struct EventHandler {
    pub plugin: String,
    pub fq_name: String,
    pub handler: Handler,
}

impl std::fmt::Debug for MessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageHandler")
            .field("fq_name", &self.fq_name)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

impl std::fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandler")
            .field("fq_name", &self.fq_name)
            .finish()
    }
}

/// Ordered, keyed dispatch tables.
///
/// Keys are `Plugin.method-pattern` for messages and `Plugin.method-event` for
/// events. Registering an existing key replaces the entry in place.
#[derive(Debug, Clone, Default)]
pub struct RegisteredActions {
    listen_to: Vec<(String, MessageHandler)>,
    respond_to: Vec<(String, MessageHandler)>,
    process: HashMap<String, Vec<(String, EventHandler)>>,
}

impl RegisteredActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listen_to(&mut self, handler: MessageHandler) {
        let key = format!("{}-{}", handler.fq_name, handler.regex.as_str());
        upsert(&mut self.listen_to, key, handler);
    }

    pub fn add_respond_to(&mut self, handler: MessageHandler) {
        let key = format!("{}-{}", handler.fq_name, handler.regex.as_str());
        upsert(&mut self.respond_to, key, handler);
    }

    pub fn add_process(&mut self, event_type: &str, handler: EventHandler) {
        let key = format!("{}-{}", handler.fq_name, event_type);
        let entries = self.process.entry(event_type.to_string()).or_default();
        upsert(entries, key, handler);
    }

    pub fn listen_to(&self) -> impl Iterator<Item = &MessageHandler> {
        self.listen_to.iter().map(|(_, h)| h)
    }

    pub fn respond_to(&self) -> impl Iterator<Item = &MessageHandler> {
        self.respond_to.iter().map(|(_, h)| h)
    }

    /// Handlers for `event_type`, in registration order
    pub fn process(&self, event_type: &str) -> impl Iterator<Item = &EventHandler> {
        self.process
            .get(event_type)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(_, h)| h))
    }

    pub fn listen_to_keys(&self) -> Vec<&str> {
        self.listen_to.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn respond_to_keys(&self) -> Vec<&str> {
        self.respond_to.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn process_keys(&self, event_type: &str) -> Vec<&str> {
        self.process
            .get(event_type)
            .map(|entries| entries.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Event types with at least one handler, sorted
    pub fn event_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.process.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn is_empty(&self) -> bool {
        self.listen_to.is_empty() && self.respond_to.is_empty() && self.process.is_empty()
    }
}

fn upsert<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        tracing::warn!("Handler {} was already registered, replacing it", key);
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}
