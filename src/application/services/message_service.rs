use crate::application::errors::BotError;
use crate::application::messaging::{Input, MessageDispatcher};
use crate::domain::traits::Bot;
use crate::plugins::EventEmitter;
use std::sync::Arc;

/// Event emitted once the service stops taking input
pub const SHUTDOWN_EVENT: &str = "shutdown";

/// Service for processing incoming traffic and sending replies
pub struct MessageService<B: Bot> {
    bot: B,
    dispatcher: MessageDispatcher,
    emitter: Arc<EventEmitter>,
}

impl<B: Bot> MessageService<B> {
    pub fn new(bot: B, dispatcher: MessageDispatcher, emitter: Arc<EventEmitter>) -> Self {
        Self { bot, dispatcher, emitter }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    /// Dispatch one input and send every reply. Returns the number of replies sent.
    pub async fn process(&self, input: Input) -> Result<usize, BotError> {
        let (channel, replies) = match input {
            Input::Message(message) => {
                tracing::debug!("Processing message in {}: {}", message.channel, message.text);
                let replies = self.dispatcher.dispatch_message(&message);
                (message.channel, replies)
            }
            Input::Event(event) => {
                tracing::debug!("Processing event: {}", event.event_type);
                let replies = self.dispatcher.dispatch_event(&event);
                let channel = event.field("channel").unwrap_or("general").to_string();
                (channel, replies)
            }
        };

        for reply in &replies {
            self.respond(&channel, reply).await?;
        }
        Ok(replies.len())
    }

    /// Send a response message
    pub async fn respond(&self, channel: &str, text: &str) -> Result<String, BotError> {
        self.bot.send_message(channel, text).await
    }

    /// Tell `shutdown` listeners the bot is stopping
    pub fn shutdown(&self) -> usize {
        tracing::info!("Shutting down");
        self.emitter.emit(SHUTDOWN_EVENT, &serde_json::Value::Null)
    }
}
