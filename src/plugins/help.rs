//! Plugin manual - help text derived from method docs and trigger patterns

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

/// Which kind of message trigger a robot help line describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    ListenTo,
    RespondTo,
}

/// Help for a single method, parsed from its doc string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HumanHelp {
    pub command: String,
    pub help: String,
}

impl HumanHelp {
    /// Parse the first line of `doc` as `command: help`.
    ///
    /// Without a colon the command is `??` and the whole line is the help.
    pub fn parse(doc: &str) -> Self {
        let first = doc.lines().next().unwrap_or("");
        let mut parts = first.split(':');
        let head = parts.next().unwrap_or("").trim();
        match parts.next() {
            Some(rest) => Self {
                command: head.to_string(),
                help: rest.trim().to_string(),
            },
            None => Self {
                command: "??".to_string(),
                help: head.to_string(),
            },
        }
    }
}

/// Robot help line for a trigger pattern
pub fn robot_help(pattern: &str, kind: TriggerKind) -> String {
    match kind {
        TriggerKind::RespondTo => format!("@botname {}", pattern),
        TriggerKind::ListenTo => pattern.to_string(),
    }
}

/// Help for all loaded plugins, grouped by plugin help line
#[derive(Debug, Clone, Default, Serialize)]
pub struct Manual {
    pub human: BTreeMap<String, BTreeMap<String, HumanHelp>>,
    pub robot: BTreeMap<String, Vec<String>>,
}

impl Manual {
    /// Make sure both sections have an entry for `class_help`
    pub fn add_plugin(&mut self, class_help: &str) {
        self.human.entry(class_help.to_string()).or_default();
        self.robot.entry(class_help.to_string()).or_default();
    }

    pub fn add_human(&mut self, class_help: &str, fq_name: &str, help: HumanHelp) {
        self.human
            .entry(class_help.to_string())
            .or_default()
            .insert(fq_name.to_string(), help);
    }

    pub fn add_robot(&mut self, class_help: &str, line: String) {
        self.robot.entry(class_help.to_string()).or_default().push(line);
    }

    /// Render the human section as chat text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (plugin, methods) in &self.human {
            if methods.is_empty() {
                continue;
            }
            out.push_str(&format!("*{}:*\n", plugin));
            for help in methods.values() {
                out.push_str(&format!("  `{}`: {}\n", help.command, help.help));
            }
        }
        if out.is_empty() {
            out.push_str("No help available.\n");
        }
        out
    }

    /// Render the robot section as chat text
    pub fn render_robot(&self) -> String {
        let mut out = String::new();
        for (plugin, lines) in &self.robot {
            if lines.is_empty() {
                continue;
            }
            out.push_str(&format!("*{}:*\n", plugin));
            for line in lines {
                out.push_str(&format!("  `{}`\n", line));
            }
        }
        out
    }
}

/// Manual shared between the manager and the help plugin
pub type SharedManual = Arc<RwLock<Manual>>;
