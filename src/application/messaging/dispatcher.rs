//! Message dispatcher - Routes messages and events to plugin handlers

use crate::application::errors::PluginResult;
use crate::domain::entities::{Event, Message};
use crate::domain::traits::BotInfo;
use crate::plugins::registry::{MessageHandler, RegisteredActions};
use super::context::{Context, Handler};
use super::parser::MessageParser;

/// Routes incoming traffic through the registered actions
pub struct MessageDispatcher {
    parser: MessageParser,
    actions: RegisteredActions,
}

impl MessageDispatcher {
    pub fn new(actions: RegisteredActions, bot: &BotInfo) -> PluginResult<Self> {
        Ok(Self {
            parser: MessageParser::new(bot)?,
            actions,
        })
    }

    pub fn parser(&self) -> &MessageParser {
        &self.parser
    }

    /// Run every matching `listen_to` handler, then, when the message is
    /// addressed to the bot, every matching `respond_to` handler against the
    /// text without the mention. Returns the replies in order.
    pub fn dispatch_message(&self, message: &Message) -> Vec<String> {
        let mut replies = Vec::new();

        for handler in self.actions.listen_to() {
            self.try_handler(handler, &message.text, message, &mut replies);
        }

        if let Some(text) = self.parser.addressed_text(message) {
            for handler in self.actions.respond_to() {
                self.try_handler(handler, &text, message, &mut replies);
            }
        }

        replies
    }

    /// Run the `process` handlers registered for the event's type
    pub fn dispatch_event(&self, event: &Event) -> Vec<String> {
        let mut replies = Vec::new();
        for handler in self.actions.process(&event.event_type) {
            tracing::debug!("Event {} -> {}", event.event_type, handler.fq_name);
            let ctx = Context::from_event(event.clone());
            collect(&handler.fq_name, &handler.handler, &ctx, &mut replies);
        }
        replies
    }

    fn try_handler(&self, handler: &MessageHandler, text: &str, message: &Message, replies: &mut Vec<String>) {
        let Some(caps) = handler.regex.captures(text) else {
            return;
        };
        tracing::debug!("[{}] {} matched '{}'", message.channel, handler.fq_name, handler.regex.as_str());
        let ctx = Context::from_message(message.clone()).with_captures(&handler.regex, &caps);
        collect(&handler.fq_name, &handler.handler, &ctx, replies);
    }
}

/// Call `handler`, keeping its reply. Failures are logged and do not stop dispatch.
fn collect(fq_name: &str, handler: &Handler, ctx: &Context, replies: &mut Vec<String>) {
    match handler(ctx) {
        Ok(Some(reply)) => replies.push(reply),
        Ok(None) => {}
        Err(e) => tracing::warn!("Handler {} failed: {}", fq_name, e),
    }
}
