//! Plugin metadata - the triggers and requirements attached to a callable

use std::ops::BitOr;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::application::errors::{PluginError, PluginResult};

/// Flags applied when compiling a trigger pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegexFlags {
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_matches_new_line: bool,
    pub ignore_whitespace: bool,
}

impl RegexFlags {
    pub const NONE: Self = Self {
        case_insensitive: false,
        multi_line: false,
        dot_matches_new_line: false,
        ignore_whitespace: false,
    };

    pub const IGNORECASE: Self = Self {
        case_insensitive: true,
        ..Self::NONE
    };

    pub const MULTILINE: Self = Self {
        multi_line: true,
        ..Self::NONE
    };

    pub const DOTALL: Self = Self {
        dot_matches_new_line: true,
        ..Self::NONE
    };

    pub const VERBOSE: Self = Self {
        ignore_whitespace: true,
        ..Self::NONE
    };

    /// Compile `pattern` with these flags
    pub fn compile(self, pattern: &str) -> PluginResult<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.case_insensitive)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_matches_new_line)
            .ignore_whitespace(self.ignore_whitespace)
            .build()
            .map_err(|source| PluginError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }
}

/// Trigger patterns are case-insensitive unless told otherwise.
impl Default for RegexFlags {
    fn default() -> Self {
        Self::IGNORECASE
    }
}

impl BitOr for RegexFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            case_insensitive: self.case_insensitive || rhs.case_insensitive,
            multi_line: self.multi_line || rhs.multi_line,
            dot_matches_new_line: self.dot_matches_new_line || rhs.dot_matches_new_line,
            ignore_whitespace: self.ignore_whitespace || rhs.ignore_whitespace,
        }
    }
}

/// Events and messages a plugin method reacts to, in registration order
#[derive(Debug, Clone, Default)]
pub struct PluginActions {
    /// Raw platform event types
    pub process: Vec<String>,
    /// Patterns matched against every message
    pub listen_to: Vec<Regex>,
    /// Patterns matched against messages addressed to the bot
    pub respond_to: Vec<Regex>,
}

/// Metadata attached to a decorated callable
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub plugin_actions: PluginActions,
    /// Setting names that must be configured; duplicates are kept
    pub required_settings: Vec<String>,
}

/// One setting name or several, as accepted by `required_settings`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredSettings {
    One(String),
    Many(Vec<String>),
}

impl RequiredSettings {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            RequiredSettings::One(name) => vec![name],
            RequiredSettings::Many(names) => names,
        }
    }
}

impl From<&str> for RequiredSettings {
    fn from(name: &str) -> Self {
        RequiredSettings::One(name.to_string())
    }
}

impl From<String> for RequiredSettings {
    fn from(name: String) -> Self {
        RequiredSettings::One(name)
    }
}

impl From<Vec<String>> for RequiredSettings {
    fn from(names: Vec<String>) -> Self {
        RequiredSettings::Many(names)
    }
}

impl From<Vec<&str>> for RequiredSettings {
    fn from(names: Vec<&str>) -> Self {
        RequiredSettings::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RequiredSettings {
    fn from(names: &[&str]) -> Self {
        RequiredSettings::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RequiredSettings {
    fn from(names: [&str; N]) -> Self {
        RequiredSettings::Many(names.iter().map(|s| s.to_string()).collect())
    }
}
