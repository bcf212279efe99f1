use eyre::{Result, eyre};
use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather
    pub bot_token: String,
    /// Chat that receives a copy of every event (optional)
    pub admin_chat_id: Option<i64>,
    /// Bot API base URL, overridable for tests and proxies
    pub api_base: String,
}

impl TelegramConfig {
    /// Loads configuration from environment variables.
    ///
    /// Returns `Ok(None)` when `TELEGRAM_BOT_TOKEN` is unset, which disables
    /// delivery.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(bot_token) = lookup("TELEGRAM_BOT_TOKEN").filter(|t| !t.trim().is_empty())
        else {
            return Ok(None);
        };

        let admin_chat_id = lookup("TELEGRAM_ADMIN_CHAT_ID")
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map_err(|_| eyre!("TELEGRAM_ADMIN_CHAT_ID must be a valid i64"))
            })
            .transpose()?;

        let api_base = lookup("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Some(Self {
            bot_token,
            admin_chat_id,
            api_base,
        }))
    }

    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}
