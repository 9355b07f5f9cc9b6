//! Plugin manager - reads plugin metadata and builds the dispatch tables

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::application::errors::{PluginError, PluginResult};
use crate::infrastructure::config::Settings;
use super::decorators::DecoratedCallable;
use super::emitter::EventEmitter;
use super::help::{robot_help, HumanHelp, Manual, SharedManual, TriggerKind};
use super::metadata::Metadata;
use super::registry::{EventHandler, MessageHandler, RegisteredActions};
use super::trait_def::{Plugin, PluginInfo, PluginMethod};

/// A plugin that passed loading
struct LoadedPlugin {
    plugin: Arc<dyn Plugin>,
    methods: Vec<String>,
}

/// Manages all plugins for the bot
pub struct PluginManager {
    settings: Settings,
    disabled: Vec<String>,
    emitter: Arc<EventEmitter>,
    plugins: BTreeMap<String, LoadedPlugin>,
    actions: RegisteredActions,
    manual: SharedManual,
}

impl PluginManager {
    /// Create a new plugin manager checking requirements against `settings`
    pub fn new(settings: Settings, emitter: Arc<EventEmitter>) -> Self {
        Self {
            settings,
            disabled: Vec::new(),
            emitter,
            plugins: BTreeMap::new(),
            actions: RegisteredActions::new(),
            manual: Arc::new(RwLock::new(Manual::default())),
        }
    }

    /// Plugins with these names are skipped by `register`
    pub fn with_disabled(mut self, disabled: Vec<String>) -> Self {
        self.disabled = disabled;
        self
    }

    /// Register an undecorated plugin
    pub fn register_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> PluginResult<()> {
        self.register(DecoratedCallable::new(plugin))
    }

    /// Register a plugin together with its plugin-level metadata.
    ///
    /// The plugin is refused when a setting required by it or by any of its
    /// methods is missing, or when its `init` fails. Tables and manual are
    /// only updated once the plugin is fully loaded.
    pub fn register<P: Plugin + 'static>(&mut self, plugin: DecoratedCallable<P>) -> PluginResult<()> {
        let (plugin, plugin_metadata) = plugin.into_parts();
        let name = plugin.name().to_string();

        if self.disabled.iter().any(|d| d.eq_ignore_ascii_case(&name)) {
            info!("Plugin {} is disabled, skipping", name);
            return Ok(());
        }
        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyLoaded(name));
        }

        debug!("Found a plugin: {}", name);
        let methods = plugin.methods()?;

        let mut missing = self.missing_settings(&plugin_metadata);
        for method in &methods {
            missing.extend(self.missing_settings(method.handler.metadata()));
        }
        if !missing.is_empty() {
            warn!("Error loading plugin {}", name);
            let err = PluginError::MissingSettings(missing);
            warn!("{}", err);
            return Err(err);
        }

        let class_help = plugin
            .description()
            .lines()
            .next()
            .filter(|line| !line.trim().is_empty())
            .unwrap_or(name.as_str())
            .to_string();

        let mut actions = self.actions.clone();
        let mut manual = self
            .manual
            .read()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))?
            .clone();
        manual.add_plugin(&class_help);
        for method in &methods {
            Self::register_method(&mut actions, &mut manual, &name, &class_help, method);
        }

        if let Err(err) = plugin.init(&self.emitter) {
            warn!("Error initialising plugin {}: {}", name, err);
            return Err(err);
        }

        let mut shared = self
            .manual
            .write()
            .map_err(|_| PluginError::Internal("Lock poisoned".to_string()))?;
        *shared = manual;
        drop(shared);
        self.actions = actions;

        let method_names = methods.iter().map(|m| m.name.clone()).collect();
        info!("Plugin {} loaded", name);
        self.plugins.insert(name, LoadedPlugin {
            plugin: Arc::new(plugin),
            methods: method_names,
        });
        Ok(())
    }

    /// Required settings of `metadata` that are not configured, upper-cased
    pub fn missing_settings(&self, metadata: &Metadata) -> Vec<String> {
        metadata
            .required_settings
            .iter()
            .filter(|setting| !self.settings.contains(setting))
            .map(|setting| setting.to_uppercase())
            .collect()
    }

    fn register_method(
        actions: &mut RegisteredActions,
        manual: &mut Manual,
        plugin: &str,
        class_help: &str,
        method: &PluginMethod,
    ) {
        let fq_name = format!("{}.{}", plugin, method.name);
        let metadata = method.handler.metadata();
        let handler = method.handler.callable();

        if let Some(doc) = &method.doc {
            let help = HumanHelp::parse(doc);
            manual.add_human(class_help, &fq_name, help);
        }

        for regex in &metadata.plugin_actions.listen_to {
            actions.add_listen_to(MessageHandler {
                plugin: plugin.to_string(),
                fq_name: fq_name.clone(),
                regex: regex.clone(),
                handler: handler.clone(),
            });
            manual.add_robot(class_help, robot_help(regex.as_str(), TriggerKind::ListenTo));
        }

        for regex in &metadata.plugin_actions.respond_to {
            actions.add_respond_to(MessageHandler {
                plugin: plugin.to_string(),
                fq_name: fq_name.clone(),
                regex: regex.clone(),
                handler: handler.clone(),
            });
            manual.add_robot(class_help, robot_help(regex.as_str(), TriggerKind::RespondTo));
        }

        for event_type in &metadata.plugin_actions.process {
            actions.add_process(event_type, EventHandler {
                plugin: plugin.to_string(),
                fq_name: fq_name.clone(),
                handler: handler.clone(),
            });
        }

        debug!("Registered {} ({:?})", fq_name, metadata.plugin_actions);
    }

    /// Dispatch tables built so far
    pub fn actions(&self) -> &RegisteredActions {
        &self.actions
    }

    /// Snapshot of the help manual
    pub fn manual(&self) -> Manual {
        self.manual.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Handle to the live manual, for plugins that render help
    pub fn shared_manual(&self) -> SharedManual {
        self.manual.clone()
    }

    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// List all loaded plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(|(name, loaded)| {
            PluginInfo {
                name: name.clone(),
                description: loaded.plugin.description().to_string(),
                methods: loaded.methods.clone(),
            }
        }).collect()
    }

    /// Check if a plugin is loaded
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::context::handler;
    use crate::plugins::decorators::{decorate, listen_to, process, required_settings, respond_to};

    struct Greeter {
        pattern: &'static str,
    }

    impl Plugin for Greeter {
        fn name(&self) -> &str {
            "Greeter"
        }

        fn description(&self) -> &str {
            "Greets people\nLonger text"
        }

        fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
            let hi = decorate(handler(|_| Ok(Some("hi".into()))), [
                respond_to(self.pattern)?,
                listen_to("^yo$")?,
                process("channel_joined"),
            ]);
            let secret = decorate(handler(|_| Ok(None)), [required_settings("api_token")]);
            Ok(vec![
                PluginMethod::new("hi", hi).with_doc("hi: say hi"),
                PluginMethod::new("secret", secret),
            ])
        }
    }

    fn manager(settings: Settings) -> PluginManager {
        PluginManager::new(settings, Arc::new(EventEmitter::new()))
    }

    #[test]
    fn test_register_builds_tables_and_help() {
        let mut m = manager([("API_TOKEN", "x")].into_iter().collect());
        m.register_plugin(Greeter { pattern: "^hi$" }).unwrap();

        assert!(m.has_plugin("Greeter"));
        assert_eq!(m.actions().respond_to_keys(), vec!["Greeter.hi-^hi$"]);
        assert_eq!(m.actions().listen_to_keys(), vec!["Greeter.hi-^yo$"]);
        assert_eq!(m.actions().process_keys("channel_joined"), vec!["Greeter.hi-channel_joined"]);

        let manual = m.manual();
        assert_eq!(manual.human["Greets people"]["Greeter.hi"], HumanHelp::parse("hi: say hi"));
        assert_eq!(manual.robot["Greets people"], vec!["^yo$", "@botname ^hi$"]);
    }

    #[test]
    fn test_missing_settings_block_loading() {
        let mut m = manager(Settings::new());
        let err = m.register_plugin(Greeter { pattern: "^hi$" }).unwrap_err();
        match err {
            PluginError::MissingSettings(missing) => assert_eq!(missing, vec!["API_TOKEN"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!m.has_plugin("Greeter"));
        assert!(m.actions().is_empty());
    }

    #[test]
    fn test_plugin_level_required_settings() {
        let mut m = manager([("api_token", "x")].into_iter().collect());
        let plugin = DecoratedCallable::new(Greeter { pattern: "^hi$" })
            .required_settings(["ENDPOINT", "region"]);
        let err = m.register(plugin).unwrap_err();
        assert!(matches!(err, PluginError::MissingSettings(ref v) if v == &vec!["ENDPOINT", "REGION"]));
    }

    #[test]
    fn test_invalid_pattern_aborts_plugin() {
        let mut m = manager([("API_TOKEN", "x")].into_iter().collect());
        let err = m.register_plugin(Greeter { pattern: "(" }).unwrap_err();
        assert!(matches!(err, PluginError::InvalidPattern { .. }));
        assert!(!m.has_plugin("Greeter"));
    }

    #[test]
    fn test_duplicate_plugin_refused() {
        let mut m = manager([("API_TOKEN", "x")].into_iter().collect());
        m.register_plugin(Greeter { pattern: "^hi$" }).unwrap();
        let err = m.register_plugin(Greeter { pattern: "^hi$" }).unwrap_err();
        assert!(matches!(err, PluginError::AlreadyLoaded(_)));
    }

    struct Broken {
        fail: bool,
    }

    impl Plugin for Broken {
        fn name(&self) -> &str {
            "Broken"
        }

        fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
            let ping = decorate(handler(|_| Ok(Some("pong".into()))), [
                respond_to("^ping$")?,
                process("team_join"),
            ]);
            Ok(vec![PluginMethod::new("ping", ping).with_doc("ping: check the bot is alive")])
        }

        fn init(&self, _emitter: &EventEmitter) -> PluginResult<()> {
            if self.fail {
                return Err(PluginError::Internal("no connection".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_failed_init_leaves_no_trace() {
        let mut m = manager(Settings::new());
        let err = m.register_plugin(Broken { fail: true }).unwrap_err();
        assert!(matches!(err, PluginError::Internal(_)));

        assert!(!m.has_plugin("Broken"));
        assert!(m.actions().is_empty());
        let manual = m.manual();
        assert!(manual.human.is_empty());
        assert!(manual.robot.is_empty());

        m.register_plugin(Broken { fail: false }).unwrap();
        assert!(m.has_plugin("Broken"));
        assert_eq!(m.actions().respond_to_keys(), vec!["Broken.ping-^ping$"]);
        assert_eq!(m.manual().robot["Broken"], vec!["@botname ^ping$"]);
    }

    #[test]
    fn test_disabled_plugin_skipped() {
        let mut m = manager(Settings::new()).with_disabled(vec!["greeter".to_string()]);
        m.register_plugin(Greeter { pattern: "^hi$" }).unwrap();
        assert!(!m.has_plugin("Greeter"));
        assert!(m.list_plugins().is_empty());
    }
}
