use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use super::Notifier;
use crate::config::NotificationsConfig;

/// Publish-to-topic delivery (ntfy.sh or a self-hosted server). The message
/// rides in the body; title, priority and actions go in headers.
pub struct NtfyNotifier {
    client: Client,
    timeout: Duration,
    endpoint: String,
}

impl NtfyNotifier {
    pub fn new(config: &NotificationsConfig) -> Self {
        let endpoint = format!(
            "{}/{}",
            config.ntfy.server.trim_end_matches('/'),
            config.ntfy.topic
        );
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.send_timeout_secs),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    fn name(&self) -> &'static str {
        "ntfy"
    }

    async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .header("Title", title)
            .header("Priority", "high")
            .header("Tags", "book,moneybag");

        if let Some(url) = link {
            request = request
                .header("Click", url)
                .header("Actions", format!("view, Buy Now, {}", url));
        }

        match request.body(message.to_string()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Ntfy notification sent");
                true
            }
            Ok(response) => {
                error!("Ntfy rejected notification: status {}", response.status());
                false
            }
            Err(e) => {
                error!("Failed to send Ntfy notification: {}", e);
                false
            }
        }
    }
}
