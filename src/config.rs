use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

use crate::models::Product;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub poller: PollerConfig,
    pub notifications: NotificationsConfig,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Seconds between full poll cycles.
    pub check_interval_secs: u64,
    /// Politeness delay between consecutive product fetches.
    pub pace_delay_secs: u64,
    /// Extra wait after a failed cycle before resuming the normal interval.
    pub error_cooldown_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Backend selector: pushover, ntfy, telegram or none.
    pub service: String,
    pub send_timeout_secs: u64,
    #[serde(default)]
    pub pushover: PushoverConfig,
    pub ntfy: NtfyConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushoverConfig {
    pub user_key: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NtfyConfig {
    pub topic: String,
    pub server: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Same pipeline with a caller-chosen config directory, so defaults can
    /// be exercised against a directory with no files in it.
    pub fn load_from(config_dir: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("poller.check_interval_secs", 3600)?
            .set_default("poller.pace_delay_secs", 2)?
            .set_default("poller.error_cooldown_secs", 60)?
            .set_default("poller.fetch_timeout_secs", 30)?
            .set_default("poller.user_agent", DEFAULT_USER_AGENT)?
            .set_default("notifications.service", "pushover")?
            .set_default("notifications.send_timeout_secs", 10)?
            .set_default("notifications.ntfy.topic", "restock-watcher-CHANGE-ME")?
            .set_default("notifications.ntfy.server", "https://ntfy.sh")?
            .set_default("products", Vec::<String>::new())?
            // Product list and overrides live in config files
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_dir)).required(false))
            // Environment variables with prefix "WATCHER_"
            .add_source(Environment::with_prefix("WATCHER").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;
        config.apply_legacy_env();
        config.validate()?;
        Ok(config)
    }

    /// Flat environment names kept for deployments that predate the
    /// prefixed form.
    fn apply_legacy_env(&mut self) {
        if let Ok(v) = env::var("CHECK_INTERVAL") {
            if let Ok(secs) = v.parse() {
                self.poller.check_interval_secs = secs;
            }
        }
        if let Ok(v) = env::var("HEALTH_PORT") {
            if let Ok(port) = v.parse() {
                self.server.port = port;
            }
        }
        if let Ok(v) = env::var("NOTIFICATION_SERVICE") {
            self.notifications.service = v;
        }
        if let Ok(v) = env::var("PUSHOVER_USER_KEY") {
            self.notifications.pushover.user_key = Some(v);
        }
        if let Ok(v) = env::var("PUSHOVER_API_TOKEN") {
            self.notifications.pushover.api_token = Some(v);
        }
        if let Ok(v) = env::var("NTFY_TOPIC") {
            self.notifications.ntfy.topic = v;
        }
        if let Ok(v) = env::var("NTFY_SERVER") {
            self.notifications.ntfy.server = v;
        }
        if let Ok(v) = env::var("TELEGRAM_BOT_TOKEN") {
            self.notifications.telegram.bot_token = Some(v);
        }
        if let Ok(v) = env::var("TELEGRAM_CHAT_ID") {
            self.notifications.telegram.chat_id = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "Server port must be greater than 0".into(),
            ));
        }

        if self.poller.check_interval_secs == 0 {
            return Err(ConfigError::Message(
                "Poller check_interval_secs must be greater than 0".into(),
            ));
        }

        if self.poller.fetch_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Poller fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.notifications.send_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "Notifications send_timeout_secs must be greater than 0".into(),
            ));
        }

        if Url::parse(&self.notifications.ntfy.server).is_err() {
            return Err(ConfigError::Message("Invalid ntfy server URL".into()));
        }

        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "Product with URL {} has an empty name",
                    product.url
                )));
            }
            if Url::parse(&product.url).is_err() {
                return Err(ConfigError::Message(format!(
                    "Invalid product URL: {}",
                    product.url
                )));
            }
        }

        Ok(())
    }
}
