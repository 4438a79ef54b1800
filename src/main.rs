use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use restock_watcher::config::AppConfig;
use restock_watcher::fetcher::{HttpFetcher, PageFetcher};
use restock_watcher::health::HealthState;
use restock_watcher::notify::{self, build_notifier, Notifier};
use restock_watcher::poller::PollCycle;
use restock_watcher::scheduler::Scheduler;
use restock_watcher::state_store::TrackingStore;
use restock_watcher::web;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("restock_watcher=debug".parse()?),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("Starting Restock Watcher...");
    info!(
        "Check interval: {} seconds ({} min)",
        config.poller.check_interval_secs,
        config.poller.check_interval_secs / 60
    );
    info!("Products watched: {}", config.products.len());
    info!("Notification service: {}", config.notifications.service);
    info!(
        "Health check: http://{}:{}/health",
        config.server.host, config.server.port
    );
    if config.notifications.service.eq_ignore_ascii_case("ntfy") {
        info!("Ntfy topic: {}", config.notifications.ntfy.topic);
    }
    if config.products.is_empty() {
        warn!("No products configured; every cycle will be a no-op");
    }

    let health = Arc::new(HealthState::new());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.poller)?);
    let notifier: Arc<dyn Notifier> = Arc::from(build_notifier(&config.notifications));
    let store = TrackingStore::open();

    // Health server runs independently of the poll loop; they only share
    // the health state.
    let server_config = config.server.clone();
    let server_health = Arc::clone(&health);
    tokio::spawn(async move {
        if let Err(e) = web::serve(&server_config, server_health).await {
            error!("Health server error: {}", e);
        }
    });

    notify::send_startup_notification(
        notifier.as_ref(),
        config.products.len(),
        config.poller.check_interval_secs,
    )
    .await;

    let cycle = PollCycle::new(
        config.products.clone(),
        fetcher,
        notifier,
        store,
        Arc::clone(&health),
        Duration::from_secs(config.poller.pace_delay_secs),
    );
    let scheduler = Scheduler::new(
        cycle,
        Duration::from_secs(config.poller.check_interval_secs),
        Duration::from_secs(config.poller.error_cooldown_secs),
    );

    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down..."),
    }

    Ok(())
}
