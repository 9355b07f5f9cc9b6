//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Plugin loading and decoration errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("The following settings are missing: {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    #[error("Plugin '{0}' already loaded")]
    AlreadyLoaded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result alias used by the plugin layer
pub type PluginResult<T> = Result<T, PluginError>;
