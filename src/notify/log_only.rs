use async_trait::async_trait;
use tracing::info;

use super::Notifier;

/// The "none" backend: notifications only reach the log. Useful for dry runs
/// and development.
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool {
        match link {
            Some(url) => info!("Notification (none mode): {} - {} ({})", title, message, url),
            None => info!("Notification (none mode): {} - {}", title, message),
        }
        true
    }
}
