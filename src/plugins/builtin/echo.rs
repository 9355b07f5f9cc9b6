//! Echo plugin

use crate::application::errors::PluginResult;
use crate::application::messaging::context::handler;
use crate::infrastructure::config::Settings;
use crate::plugins::decorators::{decorate, required_settings, respond_to};
use crate::plugins::trait_def::{Plugin, PluginMethod};

/// Setting holding the text put in front of every echo
pub const ECHO_PREFIX: &str = "ECHO_PREFIX";

/// Repeats whatever follows `echo`
pub struct EchoPlugin {
    prefix: String,
}

impl EchoPlugin {
    pub fn new(settings: &Settings) -> Self {
        Self {
            prefix: settings.get(ECHO_PREFIX).unwrap_or_default().to_string(),
        }
    }
}

impl Plugin for EchoPlugin {
    fn name(&self) -> &str {
        "EchoPlugin"
    }

    fn description(&self) -> &str {
        "Echo"
    }

    fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
        let prefix = self.prefix.clone();
        let echo = decorate(
            handler(move |ctx| Ok(ctx.get("text").map(|text| format!("{}{}", prefix, text)))),
            [
                respond_to(r"^echo (?P<text>.+)$")?,
                required_settings(ECHO_PREFIX),
            ],
        );

        Ok(vec![PluginMethod::new("echo", echo).with_doc("echo <text>: repeat after me")])
    }
}
