//! Decorators - attach trigger metadata to plugin callables
//!
//! A decorator is a single [`Decorator`] step. Steps are applied in order to a
//! [`DecoratedCallable`], which owns the callable and the one [`Metadata`]
//! record every step writes into:
//!
//! ```rust,ignore
//! let greet = decorate(handler, [
//!     respond_to("^hello$")?,
//!     process("channel_joined"),
//!     required_settings("GREETING"),
//! ]);
//! ```
//!
//! The same thing reads as a builder chain:
//!
//! ```rust,ignore
//! let greet = DecoratedCallable::new(handler)
//!     .respond_to("^hello$")?
//!     .process("channel_joined")
//!     .required_settings("GREETING");
//! ```

use regex::Regex;

use crate::application::errors::PluginResult;
use super::emitter::{EventArgs, EventEmitter, Listener};
use super::metadata::{Metadata, RegexFlags, RequiredSettings};

/// One metadata-mutating step
#[derive(Debug, Clone)]
pub enum Decorator {
    Process(String),
    ListenTo(Regex),
    RespondTo(Regex),
    RequiredSettings(Vec<String>),
}

impl Decorator {
    /// Write this step into `metadata`
    pub fn apply_to(self, metadata: &mut Metadata) {
        match self {
            Decorator::Process(event_type) => metadata.plugin_actions.process.push(event_type),
            Decorator::ListenTo(regex) => metadata.plugin_actions.listen_to.push(regex),
            Decorator::RespondTo(regex) => metadata.plugin_actions.respond_to.push(regex),
            Decorator::RequiredSettings(names) => metadata.required_settings.extend(names),
        }
    }
}

/// Process platform events of a given type. Any string is accepted.
pub fn process(event_type: impl Into<String>) -> Decorator {
    Decorator::Process(event_type.into())
}

/// Listen to messages matching `pattern`, case-insensitively
pub fn listen_to(pattern: &str) -> PluginResult<Decorator> {
    listen_to_with_flags(pattern, RegexFlags::default())
}

pub fn listen_to_with_flags(pattern: &str, flags: RegexFlags) -> PluginResult<Decorator> {
    Ok(Decorator::ListenTo(flags.compile(pattern)?))
}

/// Respond to messages addressed to the bot and matching `pattern`, case-insensitively
pub fn respond_to(pattern: &str) -> PluginResult<Decorator> {
    respond_to_with_flags(pattern, RegexFlags::default())
}

pub fn respond_to_with_flags(pattern: &str, flags: RegexFlags) -> PluginResult<Decorator> {
    Ok(Decorator::RespondTo(flags.compile(pattern)?))
}

/// Settings that must be configured for the decorated method or plugin to load
pub fn required_settings(names: impl Into<RequiredSettings>) -> Decorator {
    Decorator::RequiredSettings(names.into().into_vec())
}

/// Register `listener` for `event` on `emitter` and hand it back.
///
/// No metadata is involved; the listener is called as-is on every emit.
pub fn on<F>(emitter: &EventEmitter, event: impl Into<String>, listener: F) -> PluginResult<Listener>
where
    F: Fn(&EventArgs) + Send + Sync + 'static,
{
    emitter.on(event, listener)
}

/// Wrap `callable` and apply `steps` in order
pub fn decorate<F, I>(callable: F, steps: I) -> DecoratedCallable<F>
where
    I: IntoIterator<Item = Decorator>,
{
    DecoratedCallable::new(callable).apply_all(steps)
}

/// A callable together with the metadata its decorators attached
#[derive(Debug, Clone)]
pub struct DecoratedCallable<F> {
    callable: F,
    metadata: Metadata,
}

impl<F> DecoratedCallable<F> {
    pub fn new(callable: F) -> Self {
        Self {
            callable,
            metadata: Metadata::default(),
        }
    }

    pub fn apply(mut self, step: Decorator) -> Self {
        step.apply_to(&mut self.metadata);
        self
    }

    pub fn apply_all<I>(self, steps: I) -> Self
    where
        I: IntoIterator<Item = Decorator>,
    {
        steps.into_iter().fold(self, Self::apply)
    }

    pub fn process(self, event_type: impl Into<String>) -> Self {
        self.apply(process(event_type))
    }

    pub fn listen_to(self, pattern: &str) -> PluginResult<Self> {
        Ok(self.apply(listen_to(pattern)?))
    }

    pub fn listen_to_with_flags(self, pattern: &str, flags: RegexFlags) -> PluginResult<Self> {
        Ok(self.apply(listen_to_with_flags(pattern, flags)?))
    }

    pub fn respond_to(self, pattern: &str) -> PluginResult<Self> {
        Ok(self.apply(respond_to(pattern)?))
    }

    pub fn respond_to_with_flags(self, pattern: &str, flags: RegexFlags) -> PluginResult<Self> {
        Ok(self.apply(respond_to_with_flags(pattern, flags)?))
    }

    pub fn required_settings(self, names: impl Into<RequiredSettings>) -> Self {
        self.apply(required_settings(names))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn callable(&self) -> &F {
        &self.callable
    }

    pub fn into_parts(self) -> (F, Metadata) {
        (self.callable, self.metadata)
    }
}
