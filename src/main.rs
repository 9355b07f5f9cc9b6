use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use machine_bot::application::errors::BotError;
use machine_bot::application::messaging::MessageDispatcher;
use machine_bot::application::services::MessageService;
use machine_bot::domain::traits::{Bot, BotInfo};
use machine_bot::infrastructure::adapters::console::{ConsoleAdapter, CONSOLE_CHANNEL};
use machine_bot::infrastructure::config::Config;
use machine_bot::plugins::builtin::register_builtins;
use machine_bot::plugins::{EventEmitter, PluginManager};

#[derive(Parser)]
#[command(name = "machine-bot")]
#[command(about = "A chat bot driven by plugin metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Load plugins and report what would run
    Check,
    /// Print the plugin manual
    Manual,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let result = match cli.command {
        Commands::Run => run_bot(config),
        Commands::Check => check_plugins(config),
        Commands::Manual => print_manual(config),
        Commands::Version => {
            println!("machine-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Config {
    let mut config = if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config {}: {}, using defaults", path, e);
            Config::default()
        })
    } else {
        Config::default()
    };
    config.apply_env(std::env::vars());
    config
}

fn load_plugins(config: &Config) -> Result<PluginManager, BotError> {
    tracing::info!("Loading plugins...");
    let emitter = Arc::new(EventEmitter::new());
    let mut manager = PluginManager::new(config.settings.clone(), emitter)
        .with_disabled(config.plugins.disabled.clone());

    let skipped = register_builtins(&mut manager)?;
    for name in skipped {
        tracing::warn!("Plugin {} not loaded", name);
    }
    tracing::debug!("Registered plugin actions: {:?}", manager.actions());
    Ok(manager)
}

fn run_bot(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting machine-bot: {}", config.bot.name);
    let manager = load_plugins(&config)?;
    tracing::info!("Plugin system initialized with {} plugins", manager.list_plugins().len());

    let info = BotInfo::new(&config.bot.id, &config.bot.name);
    let dispatcher = MessageDispatcher::new(manager.actions().clone(), &info)?;
    let service = MessageService::new(ConsoleAdapter::new(info), dispatcher, manager.emitter().clone());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        service.bot().start().await?;
        while let Some(line) = service.bot().read_line().await? {
            if line.is_empty() {
                continue;
            }
            let input = service.dispatcher().parser().parse_line(CONSOLE_CHANNEL, &line);
            if let Err(e) = service.process(input).await {
                tracing::warn!("Failed to process input: {}", e);
            }
        }
        service.shutdown();
        Ok::<(), BotError>(())
    })
}

fn check_plugins(config: Config) -> Result<(), BotError> {
    let manager = load_plugins(&config)?;
    for plugin in manager.list_plugins() {
        println!("{} - {}", plugin.name, plugin.description);
        for method in plugin.methods {
            println!("  .{}", method);
        }
    }
    let actions = manager.actions();
    println!(
        "{} listen_to, {} respond_to, events: {}",
        actions.listen_to().count(),
        actions.respond_to().count(),
        actions.event_types().join(", ")
    );
    Ok(())
}

fn print_manual(config: Config) -> Result<(), BotError> {
    let manager = load_plugins(&config)?;
    let manual = serde_yaml::to_string(&manager.manual())
        .map_err(|e| BotError::Internal(format!("Failed to render manual: {}", e)))?;
    println!("{}", manual);
    Ok(())
}

fn init_config(path: &str) -> Result<(), BotError> {
    if std::path::Path::new(path).exists() {
        return Err(BotError::Internal(format!("{} already exists", path)));
    }
    let yaml = Config::default().to_yaml()?;
    std::fs::write(path, yaml)
        .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", path, e)))?;
    println!("Created {}", path);
    Ok(())
}
