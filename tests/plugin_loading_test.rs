//! Plugin loading and dispatch integration tests
//! Run with: cargo test --test plugin_loading_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use machine_bot::application::errors::{PluginError, PluginResult};
use machine_bot::application::messaging::context::handler;
use machine_bot::application::messaging::MessageDispatcher;
use machine_bot::domain::entities::{Event, Message, User};
use machine_bot::domain::traits::BotInfo;
use machine_bot::infrastructure::config::{Config, Settings};
use machine_bot::plugins::builtin::{register_builtins, EchoPlugin, HelloPlugin};
use machine_bot::plugins::decorators::{listen_to, on, process, required_settings, respond_to};
use machine_bot::plugins::{decorate, DecoratedCallable, EventEmitter, Plugin, PluginManager, PluginMethod};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn bot() -> BotInfo {
    BotInfo::new("UBOT", "machine")
}

fn manager_with(settings: Settings) -> PluginManager {
    PluginManager::new(settings, Arc::new(EventEmitter::new()))
}

/// Builtins load end to end and answer through the dispatcher
#[test]
fn test_builtins_answer_messages() {
    ensure_init();

    let config = Config::from_yaml("settings:\n  echo_prefix: \"> \"\n").unwrap();
    let mut manager = manager_with(config.settings.clone());
    let skipped = register_builtins(&mut manager).unwrap();
    assert!(skipped.is_empty());
    assert!(manager.has_plugin("HelloPlugin"));
    assert!(manager.has_plugin("EchoPlugin"));
    assert!(manager.has_plugin("HelpPlugin"));

    let dispatcher = MessageDispatcher::new(manager.actions().clone(), &bot()).unwrap();

    let alice = User::new("U1").with_real_name("Alice");
    let replies = dispatcher.dispatch_message(&Message::new("C1", "<@UBOT> hello").with_sender(alice.clone()));
    assert_eq!(replies, vec!["Hello, Alice!"]);

    let replies = dispatcher.dispatch_message(&Message::new("C1", "BYE").with_sender(alice));
    assert_eq!(replies, vec!["Bye, Alice!"]);

    let replies = dispatcher.dispatch_message(&Message::new("C1", "machine: echo one two"));
    assert_eq!(replies, vec!["> one two"]);

    let event = Event::new("channel_joined", serde_json::json!({ "channel": "C42" }));
    assert_eq!(dispatcher.dispatch_event(&event), vec!["Thanks for inviting me to C42!"]);
}

/// The help plugin sees every plugin, including ones loaded after it was built
#[test]
fn test_help_lists_loaded_plugins() {
    ensure_init();

    let mut manager = manager_with([("ECHO_PREFIX", "")].into_iter().collect());
    register_builtins(&mut manager).unwrap();
    let dispatcher = MessageDispatcher::new(manager.actions().clone(), &bot()).unwrap();

    let replies = dispatcher.dispatch_message(&Message::new("D1", "help").direct());
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("*Greetings:*"));
    assert!(replies[0].contains("`echo <text>`: repeat after me"));
    assert!(replies[0].contains("*Getting Help:*"));

    let replies = dispatcher.dispatch_message(&Message::new("D1", "robot help").direct());
    assert!(replies[0].contains("`@botname ^help$`"));
    assert!(replies[0].contains("`^bye$`"));
}

/// Missing settings keep only the affected plugin out
#[test]
fn test_missing_echo_prefix_skips_echo() {
    ensure_init();

    let mut manager = manager_with(Settings::new());
    let skipped = register_builtins(&mut manager).unwrap();
    assert_eq!(skipped, vec!["EchoPlugin"]);
    assert!(manager.has_plugin("HelloPlugin"));
    assert!(!manager.has_plugin("EchoPlugin"));

    let err = manager_with(Settings::new())
        .register_plugin(EchoPlugin::new(&Settings::new()))
        .unwrap_err();
    assert_eq!(err.to_string(), "The following settings are missing: ECHO_PREFIX");
}

struct Counter {
    hits: Arc<Mutex<Vec<String>>>,
    shutdowns: Arc<AtomicUsize>,
}

impl Plugin for Counter {
    fn name(&self) -> &str {
        "Counter"
    }

    fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
        let hits = self.hits.clone();
        let count = DecoratedCallable::new(handler(move |ctx| {
            let text = ctx.message().map(|m| m.text.clone()).unwrap_or_default();
            hits.lock().unwrap().push(text);
            Ok(None)
        }))
        .listen_to("count")?
        .listen_to("tally")?
        .process("message");

        Ok(vec![PluginMethod::new("count", count)])
    }

    fn init(&self, emitter: &EventEmitter) -> PluginResult<()> {
        let shutdowns = self.shutdowns.clone();
        on(emitter, "shutdown", move |_| {
            shutdowns.fetch_add(1, Ordering::SeqCst);
        })?;
        Ok(())
    }
}

/// One method with several patterns is registered once per pattern
#[test]
fn test_method_with_several_patterns() {
    ensure_init();

    let hits = Arc::new(Mutex::new(Vec::new()));
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let mut manager = manager_with(Settings::new());
    manager.register_plugin(Counter { hits: hits.clone(), shutdowns: shutdowns.clone() }).unwrap();
    manager.register_plugin(HelloPlugin::new()).unwrap();

    assert_eq!(
        manager.actions().listen_to_keys(),
        vec!["Counter.count-count", "Counter.count-tally", "HelloPlugin.bye-^bye$"]
    );

    let dispatcher = MessageDispatcher::new(manager.actions().clone(), &bot()).unwrap();
    dispatcher.dispatch_message(&Message::new("C1", "COUNT and tally"));
    assert_eq!(*hits.lock().unwrap(), vec!["COUNT and tally", "COUNT and tally"]);

    // Counter and HelloPlugin both listen for shutdown
    assert_eq!(manager.emitter().emit("shutdown", &serde_json::Value::Null), 2);
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
}

/// Invalid patterns surface while the plugin builds its methods
#[test]
fn test_invalid_pattern_surfaces_on_load() {
    ensure_init();

    struct Broken;
    impl Plugin for Broken {
        fn name(&self) -> &str {
            "Broken"
        }
        fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
            let m = decorate(handler(|_| Ok(None)), [listen_to("ok")?, respond_to("(")?]);
            Ok(vec![PluginMethod::new("broken", m)])
        }
    }

    let mut manager = manager_with(Settings::new());
    let err = manager.register_plugin(Broken).unwrap_err();
    assert!(matches!(err, PluginError::InvalidPattern { ref pattern, .. } if pattern == "("));
    assert!(manager.actions().is_empty());
}

/// Decorators compose on a single metadata record
#[test]
fn test_decorator_pipeline() {
    let f = decorate(
        |x: u32| x + 1,
        [
            process("message"),
            required_settings(vec!["A", "B"]),
            respond_to("hello").unwrap(),
            listen_to("bye").unwrap(),
            required_settings("C"),
            process("message"),
        ],
    );

    let meta = f.metadata();
    assert_eq!(meta.plugin_actions.process, vec!["message", "message"]);
    assert_eq!(meta.required_settings, vec!["A", "B", "C"]);
    assert_eq!(meta.plugin_actions.listen_to[0].as_str(), "bye");
    assert_eq!(meta.plugin_actions.respond_to[0].as_str(), "hello");
    assert_eq!((f.callable())(1), 2);
}
