//! Plugin system for machine-bot
//! 
//! Plugin methods carry metadata attached by decorators; the manager reads
//! it to build the dispatch tables.

pub mod builtin;
pub mod decorators;
pub mod emitter;
pub mod help;
pub mod manager;
pub mod metadata;
pub mod registry;
pub mod trait_def;

pub use decorators::{decorate, DecoratedCallable, Decorator};
pub use emitter::{EventArgs, EventEmitter, Listener};
pub use manager::PluginManager;
pub use metadata::{Metadata, PluginActions, RegexFlags, RequiredSettings};
pub use registry::RegisteredActions;
pub use trait_def::{Plugin, PluginInfo, PluginMethod};
