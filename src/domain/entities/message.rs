use super::User;
use chrono::{DateTime, Utc};

/// Represents an incoming chat message
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub channel: String,
    pub sender: Option<User>,
    pub text: String,
    /// Direct messages are always addressed to the bot
    pub is_direct: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            channel: channel.into(),
            sender: None,
            text: text.into(),
            is_direct: false,
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    pub fn direct(mut self) -> Self {
        self.is_direct = true;
        self
    }

    /// Display name of the sender, or "there" when unknown
    pub fn sender_name(&self) -> String {
        self.sender
            .as_ref()
            .map(User::display_name)
            .unwrap_or_else(|| "there".to_string())
    }
}
