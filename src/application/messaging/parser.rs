//! Message parser - mention detection and console input parsing

use regex::{Regex, RegexBuilder};

use crate::application::errors::{PluginError, PluginResult};
use crate::domain::entities::{Event, Message, User};
use crate::domain::traits::BotInfo;

/// A parsed line of console input
#[derive(Debug, Clone)]
pub enum Input {
    Message(Message),
    Event(Event),
}

/// Recognises messages addressed to the bot
pub struct MessageParser {
    mention: Regex,
}

impl MessageParser {
    /// Mentions are `<@BOT_ID>` or `@bot_name` / `bot_name`, optionally followed by `:`.
    /// A blank bot name only allows the id form.
    pub fn new(bot: &BotInfo) -> PluginResult<Self> {
        let id = regex::escape(&bot.id);
        let name = bot.name.trim();
        let pattern = if name.is_empty() {
            format!(r"^<@{}>:?\s*(.*)$", id)
        } else {
            format!(r"^(?:<@{}>|@?{}\b):?\s*(.*)$", id, regex::escape(name))
        };
        let mention = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| PluginError::InvalidPattern { pattern, source })?;
        Ok(Self { mention })
    }

    /// Text of `message` with the bot mention removed, if the message is
    /// addressed to the bot. Direct messages always are.
    pub fn addressed_text(&self, message: &Message) -> Option<String> {
        let text = message.text.trim();
        if let Some(caps) = self.mention.captures(text) {
            return caps.get(1).map(|m| m.as_str().trim().to_string());
        }
        if message.is_direct {
            return Some(text.to_string());
        }
        None
    }

    /// Parse a console line. `!event <type> [json]` produces an event,
    /// anything else a message from the console user.
    pub fn parse_line(&self, channel: &str, line: &str) -> Input {
        if let Some(rest) = line.strip_prefix("!event") {
            let rest = rest.trim();
            let (event_type, payload) = match rest.split_once(char::is_whitespace) {
                Some((t, json)) => (t, json.trim()),
                None => (rest, ""),
            };
            if !event_type.is_empty() {
                let payload = if payload.is_empty() {
                    serde_json::json!({ "channel": channel })
                } else {
                    serde_json::from_str(payload).unwrap_or_else(|e| {
                        tracing::warn!("Event payload is not JSON ({}), passing it as text", e);
                        serde_json::Value::String(payload.to_string())
                    })
                };
                return Input::Event(Event::new(event_type, payload));
            }
        }

        Input::Message(
            Message::new(channel, line)
                .with_sender(User::new("console").with_username("you")),
        )
    }
}
