//! Help plugin - renders the manual built from every loaded plugin

use crate::application::errors::{BotError, PluginResult};
use crate::application::messaging::context::handler;
use crate::plugins::decorators::respond_to;
use crate::plugins::help::SharedManual;
use crate::plugins::trait_def::{Plugin, PluginMethod};
use crate::plugins::DecoratedCallable;

pub struct HelpPlugin {
    manual: SharedManual,
}

impl HelpPlugin {
    pub fn new(manual: SharedManual) -> Self {
        Self { manual }
    }
}

impl Plugin for HelpPlugin {
    fn name(&self) -> &str {
        "HelpPlugin"
    }

    fn description(&self) -> &str {
        "Getting Help"
    }

    fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
        let manual = self.manual.clone();
        let help = DecoratedCallable::new(handler(move |_| {
            let manual = manual
                .read()
                .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
            Ok(Some(manual.render()))
        }))
        .apply(respond_to(r"^help$")?);

        let manual = self.manual.clone();
        let robot_help = DecoratedCallable::new(handler(move |_| {
            let manual = manual
                .read()
                .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
            Ok(Some(manual.render_robot()))
        }))
        .respond_to(r"^robot help$")?;

        Ok(vec![
            PluginMethod::new("help", help).with_doc("help: how to use this bot"),
            PluginMethod::new("robot_help", robot_help)
                .with_doc("robot help: the regular expressions this bot listens to"),
        ])
    }
}
