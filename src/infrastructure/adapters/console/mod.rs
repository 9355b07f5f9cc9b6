//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

/// Channel name used for everything typed on the console
pub const CONSOLE_CHANNEL: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(info: BotInfo) -> Self {
        Self {
            info,
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Next line from stdin, `None` on EOF
    pub async fn read_line(&self) -> Result<Option<String>, BotError> {
        let mut lines = self.lines.lock().await;
        lines
            .next_line()
            .await
            .map(|line| line.map(|l| l.trim().to_string()))
            .map_err(|e| BotError::Internal(format!("Failed to read stdin: {}", e)))
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode) as @{}", self.info.name);
        println!("Type a message. Mention the bot with @{} or <@{}>.", self.info.name, self.info.id);
        println!("Send a raw event with: !event <type> [json]");
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT #{}] {}", channel, text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
