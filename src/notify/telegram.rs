use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

use super::Notifier;
use crate::config::NotificationsConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram bot delivery: one JSON POST to the bot sendMessage endpoint with
/// Markdown formatting and an inline purchase link.
pub struct TelegramNotifier {
    client: Client,
    timeout: Duration,
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
}

impl TelegramNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self::with_api_base(config, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(config: &NotificationsConfig, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.send_timeout_secs),
            bot_token: config.telegram.bot_token.clone(),
            chat_id: config.telegram.chat_id.clone(),
            api_base: api_base.into(),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().filter(|s| !s.is_empty())?;
        let chat_id = self.chat_id.as_deref().filter(|s| !s.is_empty())?;
        Some((token, chat_id))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool {
        let Some((token, chat_id)) = self.credentials() else {
            warn!("Telegram not configured. Set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID");
            return false;
        };

        let mut text = format!("*{}*\n\n{}", title, message);
        if let Some(url) = link {
            text.push_str(&format!("\n\n[Buy Now]({})", url));
        }

        let endpoint = format!("{}/bot{}/sendMessage", self.api_base, token);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": false,
        });

        let result = self
            .client
            .post(&endpoint)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("Telegram notification sent");
                true
            }
            Ok(response) => {
                error!("Telegram rejected notification: status {}", response.status());
                false
            }
            Err(e) => {
                error!("Failed to send Telegram notification: {}", e);
                false
            }
        }
    }
}
