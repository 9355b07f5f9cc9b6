//! Handler context - what a plugin method receives when it is triggered

use std::collections::HashMap;
use std::sync::Arc;

use regex::{Captures, Regex};

use crate::application::errors::BotError;
use crate::domain::entities::{Event, Message};

/// What triggered the handler
#[derive(Debug, Clone)]
pub enum Trigger {
    Message(Message),
    Event(Event),
}

/// Context passed to plugin handlers
#[derive(Debug, Clone)]
pub struct Context {
    pub trigger: Trigger,
    /// Named capture groups of the matching pattern
    pub captures: HashMap<String, String>,
}

impl Context {
    pub fn from_message(message: Message) -> Self {
        Self {
            trigger: Trigger::Message(message),
            captures: HashMap::new(),
        }
    }

    pub fn from_event(event: Event) -> Self {
        Self {
            trigger: Trigger::Event(event),
            captures: HashMap::new(),
        }
    }

    /// Copy the named groups `regex` captured into the context
    pub fn with_captures(mut self, regex: &Regex, caps: &Captures<'_>) -> Self {
        for name in regex.capture_names().flatten() {
            if let Some(m) = caps.name(name) {
                self.captures.insert(name.to_string(), m.as_str().to_string());
            }
        }
        self
    }

    pub fn message(&self) -> Option<&Message> {
        match &self.trigger {
            Trigger::Message(message) => Some(message),
            Trigger::Event(_) => None,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        match &self.trigger {
            Trigger::Event(event) => Some(event),
            Trigger::Message(_) => None,
        }
    }

    /// Get a named capture
    pub fn get(&self, key: &str) -> Option<&str> {
        self.captures.get(key).map(String::as_str)
    }
}

/// Handler result - an optional reply
pub type HandlerResult = Result<Option<String>, BotError>;

/// Handler function type
pub type Handler = Arc<dyn Fn(&Context) -> HandlerResult + Send + Sync>;

/// Box a closure as a [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Context) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}
