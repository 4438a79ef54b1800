use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Process-wide health record. One writer (the poll loop), many readers (the
/// HTTP handlers); updates are at most once per poll interval, so a plain
/// RwLock is enough.
pub struct HealthState {
    started_at: DateTime<Utc>,
    inner: RwLock<HealthInner>,
}

#[derive(Debug, Clone)]
struct HealthInner {
    last_check: Option<DateTime<Utc>>,
    last_check_success: bool,
    total_checks: u64,
    total_errors: u64,
    products_available: u64,
}

/// Wire shape of the `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub last_check: Option<DateTime<Utc>>,
    pub last_check_success: bool,
    pub total_checks: u64,
    pub total_errors: u64,
    pub products_available: u64,
    pub uptime_seconds: f64,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            inner: RwLock::new(HealthInner {
                last_check: None,
                // Starts optimistic: /health reports healthy until a cycle
                // actually fails. Readiness gating is /ready's job.
                last_check_success: true,
                total_checks: 0,
                total_errors: 0,
                products_available: 0,
            }),
        }
    }

    pub async fn record_cycle_start(&self) {
        let mut inner = self.inner.write().await;
        inner.last_check = Some(Utc::now());
        inner.total_checks += 1;
    }

    pub async fn record_success(&self, products_available: u64) {
        let mut inner = self.inner.write().await;
        inner.last_check_success = true;
        inner.products_available = products_available;
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.write().await;
        inner.last_check_success = false;
        inner.total_errors += 1;
    }

    /// True once at least one cycle has completed (successfully or not).
    pub async fn is_ready(&self) -> bool {
        self.inner.read().await.last_check.is_some()
    }

    pub async fn is_healthy(&self) -> bool {
        self.inner.read().await.last_check_success
    }

    pub async fn snapshot(&self) -> HealthSnapshot {
        let inner = self.inner.read().await;
        let uptime = Utc::now().signed_duration_since(self.started_at);

        HealthSnapshot {
            status: if inner.last_check_success {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            started_at: self.started_at,
            last_check: inner.last_check,
            last_check_success: inner.last_check_success,
            total_checks: inner.total_checks,
            total_errors: inner.total_errors,
            products_available: inner.products_available,
            uptime_seconds: uptime.num_milliseconds().max(0) as f64 / 1000.0,
        }
    }
}
