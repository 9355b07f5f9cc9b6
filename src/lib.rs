//! machine-bot - a chat bot whose plugins declare their triggers as metadata
//!
//! Plugin methods are wrapped in [`plugins::DecoratedCallable`] and decorated
//! with `process`, `listen_to`, `respond_to` and `required_settings` steps.
//! The [`plugins::PluginManager`] reads that metadata into dispatch tables
//! used by [`application::messaging::MessageDispatcher`].

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
