//! Plugin trait definitions

use crate::application::errors::PluginResult;
use crate::application::messaging::context::Handler;
use super::decorators::DecoratedCallable;
use super::emitter::EventEmitter;

/// Core plugin trait that all plugins must implement
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin
    fn name(&self) -> &str;

    /// Human-readable description; the first line heads the plugin's help
    fn description(&self) -> &str {
        ""
    }

    /// Decorated methods of the plugin.
    ///
    /// Building a method can fail on an invalid trigger pattern, which aborts
    /// loading of the whole plugin.
    fn methods(&self) -> PluginResult<Vec<PluginMethod>>;

    /// Called once after the plugin's methods are registered
    fn init(&self, _emitter: &EventEmitter) -> PluginResult<()> {
        Ok(())
    }
}

/// A named, decorated plugin method
#[derive(Clone)]
pub struct PluginMethod {
    pub name: String,
    /// First line reads `command: help text`
    pub doc: Option<String>,
    pub handler: DecoratedCallable<Handler>,
}

impl PluginMethod {
    pub fn new(name: impl Into<String>, handler: DecoratedCallable<Handler>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            handler,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl std::fmt::Debug for PluginMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginMethod")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("metadata", self.handler.metadata())
            .finish()
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub methods: Vec<String>,
}
