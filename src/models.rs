use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product page to watch. Identity is the URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub store: StoreKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Panini,
    Amazon,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Panini => "panini",
            StoreKind::Amazon => "amazon",
        }
    }
}

/// Outcome of evaluating a fetched product page. Produced fresh each poll,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub available: bool,
    pub price: Option<String>,
}

impl AvailabilityResult {
    pub fn available(price: Option<String>) -> Self {
        Self {
            available: true,
            price,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            price: None,
        }
    }
}

/// On-disk shape of the set of already-notified product URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifiedState {
    pub notified: Vec<String>,
    pub updated: DateTime<Utc>,
}
