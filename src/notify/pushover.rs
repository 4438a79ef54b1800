use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};

use super::Notifier;
use crate::config::NotificationsConfig;

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover delivery: a single form-encoded POST per notification, priority
/// high with a cash-register sound.
pub struct PushoverNotifier {
    client: Client,
    timeout: Duration,
    user_key: Option<String>,
    api_token: Option<String>,
    api_url: String,
}

impl PushoverNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self::with_api_url(config, PUSHOVER_API_URL)
    }

    pub fn with_api_url(config: &NotificationsConfig, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.send_timeout_secs),
            user_key: config.pushover.user_key.clone(),
            api_token: config.pushover.api_token.clone(),
            api_url: api_url.into(),
        }
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let user = self.user_key.as_deref().filter(|s| !s.is_empty())?;
        let token = self.api_token.as_deref().filter(|s| !s.is_empty())?;
        Some((user, token))
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    fn name(&self) -> &'static str {
        "pushover"
    }

    async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool {
        let Some((user, token)) = self.credentials() else {
            warn!("Pushover not configured. Set PUSHOVER_USER_KEY and PUSHOVER_API_TOKEN");
            return false;
        };

        let mut form = vec![
            ("token", token),
            ("user", user),
            ("title", title),
            ("message", message),
            ("priority", "1"),
            ("sound", "cashregister"),
        ];
        if let Some(url) = link {
            form.push(("url", url));
            form.push(("url_title", "Buy Now"));
        }

        let result = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!("Pushover notification sent");
                true
            }
            Ok(response) => {
                error!("Pushover rejected notification: status {}", response.status());
                false
            }
            Err(e) => {
                error!("Failed to send Pushover notification: {}", e);
                false
            }
        }
    }
}
