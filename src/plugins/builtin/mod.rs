//! Plugins shipped with the bot

pub mod echo;
pub mod hello;
pub mod help;

pub use echo::EchoPlugin;
pub use hello::HelloPlugin;
pub use help::HelpPlugin;

use crate::application::errors::{PluginError, PluginResult};
use super::PluginManager;

/// Register every built-in plugin.
///
/// Plugins with missing settings are skipped and returned by name; any other
/// failure aborts loading.
pub fn register_builtins(manager: &mut PluginManager) -> PluginResult<Vec<String>> {
    let mut skipped = Vec::new();
    let echo = EchoPlugin::new(manager.settings());
    let help = HelpPlugin::new(manager.shared_manual());

    let results = [
        ("HelloPlugin", manager.register_plugin(HelloPlugin::new())),
        ("EchoPlugin", manager.register_plugin(echo)),
        ("HelpPlugin", manager.register_plugin(help)),
    ];
    for (name, result) in results {
        match result {
            Ok(()) => {}
            Err(PluginError::MissingSettings(_)) => skipped.push(name.to_string()),
            Err(e) => return Err(e),
        }
    }
    Ok(skipped)
}
