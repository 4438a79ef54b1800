use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::checkers::checker_for;
use crate::fetcher::PageFetcher;
use crate::health::HealthState;
use crate::models::{AvailabilityResult, Product};
use crate::notify::Notifier;
use crate::state_store::TrackingStore;
use crate::utils::error::Result;

struct NewlyAvailable {
    name: String,
    url: String,
    price: Option<String>,
}

/// One full pass over the configured products: fetch, classify, reconcile
/// against the notified set, dispatch alerts for fresh availability, persist.
/// Cycles run strictly sequentially and never overlap.
pub struct PollCycle {
    products: Vec<Product>,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    store: TrackingStore,
    health: Arc<HealthState>,
    pace_delay: Duration,
}

impl PollCycle {
    pub fn new(
        products: Vec<Product>,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        store: TrackingStore,
        health: Arc<HealthState>,
        pace_delay: Duration,
    ) -> Self {
        Self {
            products,
            fetcher,
            notifier,
            store,
            health,
            pace_delay,
        }
    }

    pub async fn run_once(&self) -> Result<()> {
        info!("Starting availability check for {} products", self.products.len());
        self.health.record_cycle_start().await;

        match self.execute().await {
            Ok(available_count) => {
                self.health.record_success(available_count).await;
                info!("Check finished: {} products available", available_count);
                Ok(())
            }
            Err(e) => {
                self.health.record_failure().await;
                Err(e)
            }
        }
    }

    async fn execute(&self) -> Result<u64> {
        // The set is reloaded from disk every cycle on purpose: external
        // edits between cycles are picked up, and this loop is the only
        // writer.
        let mut notified = self.store.load();
        let mut newly_available: Vec<NewlyAvailable> = Vec::new();
        let mut available_count = 0u64;

        for product in &self.products {
            info!("Checking: {}", product.name);

            let result = self.check_product(product).await;

            if result.available {
                available_count += 1;
                match result.price.as_deref() {
                    Some(price) => info!("  -> available at {}", price),
                    None => info!("  -> available"),
                }

                if notified.insert(product.url.clone()) {
                    newly_available.push(NewlyAvailable {
                        name: product.name.clone(),
                        url: product.url.clone(),
                        price: result.price,
                    });
                }
            } else {
                info!("  -> unavailable");
                // Dropping the URL re-arms the alert for the next time the
                // product comes back in stock.
                notified.remove(&product.url);
            }

            // Politeness toward the target site, not a performance knob.
            tokio::time::sleep(self.pace_delay).await;
        }

        for item in &newly_available {
            let message = match item.price.as_deref() {
                Some(price) => format!("{} is available for {}!", item.name, price),
                None => format!("{} is available for purchase!", item.name),
            };

            if !self
                .notifier
                .send("Back in stock!", &message, Some(&item.url))
                .await
            {
                error!("Notification dispatch failed for {}", item.name);
            }
        }

        self.store.save(&notified);

        Ok(available_count)
    }

    /// Transport failures read as unavailable; they never become cycle
    /// errors.
    async fn check_product(&self, product: &Product) -> AvailabilityResult {
        let document = match self.fetcher.fetch(&product.url).await {
            Ok(document) => document,
            Err(e) => {
                error!("Error fetching {}: {}", product.url, e);
                return AvailabilityResult::unavailable();
            }
        };

        checker_for(product.store).evaluate(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoreKind;
    use crate::utils::error::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serves canned page bodies; URLs without an entry fail like a
    /// transport error.
    struct FakeFetcher {
        pages: Mutex<HashMap<String, String>>,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                pages: Mutex::new(HashMap::new()),
            }
        }

        fn set_page(&self, url: &str, body: &str) {
            self.pages
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_string());
        }

        fn remove_page(&self, url: &str) {
            self.pages.lock().unwrap().remove(url);
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::Fetch {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String, Option<String>)>>,
    }

    impl RecordingNotifier {
        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        fn messages(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, m, _)| m.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, title: &str, message: &str, link: Option<&str>) -> bool {
            self.sent.lock().unwrap().push((
                title.to_string(),
                message.to_string(),
                link.map(String::from),
            ));
            true
        }
    }

    const AVAILABLE_PAGE: &str =
        r#"<html><body><span class="price">R$199,90</span></body></html>"#;
    const AVAILABLE_NO_PRICE_PAGE: &str = "<html><body><h1>Item</h1></body></html>";
    const UNAVAILABLE_PAGE: &str =
        r#"<html><body><a href="/productalert/add">Avise-me</a></body></html>"#;

    fn product(name: &str, url: &str) -> Product {
        Product {
            name: name.to_string(),
            url: url.to_string(),
            store: StoreKind::Panini,
        }
    }

    struct Harness {
        cycle: PollCycle,
        fetcher: Arc<FakeFetcher>,
        notifier: Arc<RecordingNotifier>,
        health: Arc<HealthState>,
        _dir: TempDir,
    }

    fn harness(products: Vec<Product>) -> Harness {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let health = Arc::new(HealthState::new());

        let cycle = PollCycle::new(
            products,
            Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            TrackingStore::with_dir(dir.path()),
            Arc::clone(&health),
            Duration::ZERO,
        );

        Harness {
            cycle,
            fetcher,
            notifier,
            health,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn test_new_availability_dispatches_once() {
        let h = harness(vec![product("A", "https://store/a")]);
        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);

        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 1);
        assert_eq!(
            h.notifier.messages()[0],
            "A is available for R$199,90!"
        );

        // Second cycle with no change: already notified, nothing dispatched.
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_resets_notification_state() {
        let h = harness(vec![product("A", "https://store/a")]);

        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 1);

        h.fetcher.set_page("https://store/a", UNAVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 1);

        // Available again: exactly one more dispatch.
        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_reads_as_unavailable() {
        let h = harness(vec![product("A", "https://store/a")]);
        // No page registered: every fetch errors.

        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 0);

        let snapshot = h.health.snapshot().await;
        assert_eq!(snapshot.status, "healthy");
        assert_eq!(snapshot.products_available, 0);
    }

    #[tokio::test]
    async fn test_three_product_scenario() {
        let h = harness(vec![
            product("A", "https://store/a"),
            product("B", "https://store/b"),
            product("C", "https://store/c"),
        ]);

        // Cycle 1: A available with price, B unavailable, C available
        // without price.
        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.fetcher.set_page("https://store/b", UNAVAILABLE_PAGE);
        h.fetcher.set_page("https://store/c", AVAILABLE_NO_PRICE_PAGE);

        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 2);
        let messages = h.notifier.messages();
        assert_eq!(messages[0], "A is available for R$199,90!");
        assert_eq!(messages[1], "C is available for purchase!");
        assert_eq!(h.health.snapshot().await.products_available, 2);

        // Cycle 2: no changes, nothing new.
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 2);

        // Cycle 3: A goes unavailable; its slot is re-armed silently.
        h.fetcher.set_page("https://store/a", UNAVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 2);
        assert_eq!(h.health.snapshot().await.products_available, 1);

        // Cycle 4: A comes back, exactly one new dispatch.
        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 3);
        assert_eq!(h.health.snapshot().await.products_available, 2);
    }

    #[tokio::test]
    async fn test_notified_set_persists_across_cycle_objects() {
        let dir = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.set_page("https://store/a", AVAILABLE_PAGE);

        let first_notifier = Arc::new(RecordingNotifier::default());
        let first = PollCycle::new(
            vec![product("A", "https://store/a")],
            Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
            Arc::clone(&first_notifier) as Arc<dyn Notifier>,
            TrackingStore::with_dir(dir.path()),
            Arc::new(HealthState::new()),
            Duration::ZERO,
        );
        first.run_once().await.unwrap();
        assert_eq!(first_notifier.sent_count(), 1);

        // Simulated restart: fresh cycle over the same data directory must
        // not re-notify.
        let second_notifier = Arc::new(RecordingNotifier::default());
        let second = PollCycle::new(
            vec![product("A", "https://store/a")],
            Arc::clone(&fetcher) as Arc<dyn PageFetcher>,
            Arc::clone(&second_notifier) as Arc<dyn Notifier>,
            TrackingStore::with_dir(dir.path()),
            Arc::new(HealthState::new()),
            Duration::ZERO,
        );
        second.run_once().await.unwrap();
        assert_eq!(second_notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_removes_from_notified_set() {
        let h = harness(vec![product("A", "https://store/a")]);

        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 1);

        // Transport failure counts as unavailable, which re-arms the alert.
        h.fetcher.remove_page("https://store/a");
        h.cycle.run_once().await.unwrap();

        h.fetcher.set_page("https://store/a", AVAILABLE_PAGE);
        h.cycle.run_once().await.unwrap();
        assert_eq!(h.notifier.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_health_counters_track_cycles() {
        let h = harness(vec![product("A", "https://store/a")]);
        h.fetcher.set_page("https://store/a", UNAVAILABLE_PAGE);

        h.cycle.run_once().await.unwrap();
        h.cycle.run_once().await.unwrap();

        let snapshot = h.health.snapshot().await;
        assert_eq!(snapshot.total_checks, 2);
        assert_eq!(snapshot.total_errors, 0);
        assert!(snapshot.last_check.is_some());
    }
}
