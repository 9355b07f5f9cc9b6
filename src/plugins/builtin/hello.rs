//! Greetings plugin

use crate::application::errors::PluginResult;
use crate::application::messaging::context::{handler, Context};
use crate::plugins::decorators::{decorate, listen_to, on, process, respond_to};
use crate::plugins::emitter::EventEmitter;
use crate::plugins::trait_def::{Plugin, PluginMethod};

/// Says hello and goodbye, and welcomes itself into new channels
#[derive(Debug, Default)]
pub struct HelloPlugin;

impl HelloPlugin {
    pub fn new() -> Self {
        Self
    }
}

fn sender(ctx: &Context) -> String {
    ctx.message()
        .map(|m| m.sender_name())
        .unwrap_or_else(|| "there".to_string())
}

impl Plugin for HelloPlugin {
    fn name(&self) -> &str {
        "HelloPlugin"
    }

    fn description(&self) -> &str {
        "Greetings"
    }

    fn methods(&self) -> PluginResult<Vec<PluginMethod>> {
        let greet = decorate(
            handler(|ctx| Ok(Some(format!("Hello, {}!", sender(ctx))))),
            [respond_to(r"^(hi|hello)\b")?],
        );

        let bye = decorate(
            handler(|ctx| Ok(Some(format!("Bye, {}!", sender(ctx))))),
            [listen_to(r"^bye$")?],
        );

        let welcome = decorate(
            handler(|ctx| {
                let channel = ctx
                    .event()
                    .and_then(|e| e.field("channel"))
                    .unwrap_or("this channel");
                Ok(Some(format!("Thanks for inviting me to {}!", channel)))
            }),
            [process("channel_joined")],
        );

        Ok(vec![
            PluginMethod::new("greet", greet).with_doc("hi: say hello to the bot"),
            PluginMethod::new("bye", bye).with_doc("bye: wave goodbye"),
            PluginMethod::new("welcome", welcome),
        ])
    }

    fn init(&self, emitter: &EventEmitter) -> PluginResult<()> {
        on(emitter, "shutdown", |_| tracing::info!("HelloPlugin saying goodbye"))?;
        Ok(())
    }
}
