// Notification backend implementations
pub mod log_only;
pub mod ntfy;
pub mod pushover;
pub mod telegram;

pub use log_only::LogOnlyNotifier;
pub use ntfy::NtfyNotifier;
pub use pushover::PushoverNotifier;
pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use tracing::warn;

use crate::config::NotificationsConfig;

/// Fire-and-forget outbound messaging seam.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns true when the backend transport accepted the message. This is
    /// not proof of delivery. Never fails into the caller: credential gaps
    /// and transport errors are logged and become `false`.
    async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool;
}

/// Resolves the configured backend once at startup.
pub fn build_notifier(config: &NotificationsConfig) -> Box<dyn Notifier> {
    match config.service.to_lowercase().as_str() {
        "pushover" => Box::new(PushoverNotifier::new(config)),
        "ntfy" => Box::new(NtfyNotifier::new(config)),
        "telegram" => Box::new(TelegramNotifier::new(config)),
        "none" => Box::new(LogOnlyNotifier),
        other => {
            warn!("Unknown notification service: {}", other);
            Box::new(UnknownNotifier {
                service: other.to_string(),
            })
        }
    }
}

/// One test notification so a fresh deployment proves its backend works.
/// Returns whether the backend accepted it; a failure here is worth a log
/// line but never aborts startup.
pub async fn send_startup_notification(
    notifier: &dyn Notifier,
    product_count: usize,
    check_interval_secs: u64,
) -> bool {
    let accepted = notifier
        .send(
            "Restock Watcher started",
            &format!(
                "Monitoring {} products. Interval: {} min",
                product_count,
                check_interval_secs / 60
            ),
            None,
        )
        .await;
    if !accepted {
        warn!(
            "Startup notification was not accepted by {}",
            notifier.name()
        );
    }
    accepted
}

/// Stand-in for an unrecognized backend selector. Selection mistakes are not
/// fatal; every send warns and reports failure instead.
pub struct UnknownNotifier {
    service: String,
}

#[async_trait]
impl Notifier for UnknownNotifier {
    fn name(&self) -> &'static str {
        "unknown"
    }

    async fn send(&self, _title: &str, _message: &str, _link: Option<&str>) -> bool {
        warn!("Unknown notification service: {}", self.service);
        false
    }
}
