use std::sync::Arc;

use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use salon_core::notify::{Notification, Notifier};
use salon_core::store::ClientDirectory;
use serde_json::json;
use tokio::runtime::Handle;
use tracing::{debug, error, warn};

use crate::config::TelegramConfig;
use crate::messages::{admin_message, client_message};

/// Delivers lifecycle events through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    config: Arc<TelegramConfig>,
    clients: Arc<dyn ClientDirectory>,
    timezone: Tz,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, clients: Arc<dyn ClientDirectory>, timezone: Tz) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            clients,
            timezone,
        }
    }

    async fn send_message(&self, chat_id: i64, text: String) -> Result<()> {
        let response = self
            .http
            .post(self.config.send_message_url())
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .wrap_err("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("Telegram responded with {}: {}", status, body));
        }
        Ok(())
    }

    /// Sends `notification` to its recipient and the admin chat.
    ///
    /// Each leg is attempted independently; failures are logged, not returned.
    pub async fn deliver(&self, notification: Notification) {
        match self.clients.find_client(notification.recipient_id).await {
            Ok(Some(client)) => match client.telegram_id {
                Some(chat_id) => {
                    let text = client_message(&notification, self.timezone);
                    if let Err(e) = self.send_message(chat_id, text).await {
                        error!(
                            appointment_id = %notification.appointment_id,
                            client_id = %client.id,
                            "Failed to notify client: {:#}",
                            e
                        );
                    }
                }
                None => debug!(client_id = %client.id, "Client has no Telegram chat"),
            },
            Ok(None) => warn!(
                recipient_id = %notification.recipient_id,
                "Notification recipient not found"
            ),
            Err(e) => error!(
                recipient_id = %notification.recipient_id,
                "Failed to look up notification recipient: {}",
                e
            ),
        }

        if let Some(admin_chat) = self.config.admin_chat_id {
            let text = admin_message(&notification, self.timezone);
            if let Err(e) = self.send_message(admin_chat, text).await {
                error!(
                    appointment_id = %notification.appointment_id,
                    "Failed to notify admin chat: {:#}",
                    e
                );
            }
        }
    }
}

impl Notifier for TelegramNotifier {
    fn dispatch(&self, notification: Notification) {
        let Ok(handle) = Handle::try_current() else {
            warn!(
                appointment_id = %notification.appointment_id,
                "No async runtime, Telegram notification dropped"
            );
            return;
        };

        let notifier = self.clone();
        handle.spawn(async move {
            notifier.deliver(notification).await;
        });
    }
}
