use teloxide::requests::Requester;
use teloxide::types::ChatId;
use teloxide::Bot;
use tracing::{error, info};

use crate::config::Config;

/// A rendered digest ready for delivery, with its recipients already
/// resolved from the settings table.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub recipients: Vec<i64>,
    pub subject: String,
    pub body: String,
}

/// Telegram delivery adapter. Formatting stays pure in `formatters`; this
/// only moves bytes. Send failures are logged and never retried.
pub struct Notifier {
    bot: Bot,
}

impl Notifier {
    pub fn new(config: &Config) -> Option<Self> {
        let telegram = config.telegram.as_ref()?;
        if !telegram.notifications_enabled {
            info!("Telegram notifications are disabled in config");
            return None;
        }

        Some(Self {
            bot: Bot::new(telegram.bot_token.clone()),
        })
    }

    pub async fn send_digest(&self, digest: &Digest) {
        let message = format!("{}\n\n{}", digest.subject, digest.body);

        for chat_id in &digest.recipients {
            match self.bot.send_message(ChatId(*chat_id), &message).await {
                Ok(_) => info!("Digest sent to chat {}", chat_id),
                Err(e) => error!("Failed to send digest to chat {}: {}", chat_id, e),
            }
        }
    }
}
