use std::time::Duration;
use tracing::{error, info};

use crate::poller::PollCycle;

/// Fixed-interval driver for the poll cycle. One immediate run at startup,
/// then sleep/run forever. A failed cycle adds a cooldown before the next
/// interval wait so a persistent failure cannot hot-loop.
pub struct Scheduler {
    cycle: PollCycle,
    interval: Duration,
    error_cooldown: Duration,
}

impl Scheduler {
    pub fn new(cycle: PollCycle, interval: Duration, error_cooldown: Duration) -> Self {
        Self {
            cycle,
            interval,
            error_cooldown,
        }
    }

    pub async fn run(&self) {
        // Initial check runs right away; a failure here is logged but must
        // not abort startup.
        if let Err(e) = self.cycle.run_once().await {
            error!("Initial check failed: {}", e);
        }

        loop {
            info!("Next check in {} seconds", self.interval.as_secs());
            tokio::time::sleep(self.interval).await;

            if let Err(e) = self.cycle.run_once().await {
                error!("Check failed: {}", e);
                tokio::time::sleep(self.error_cooldown).await;
            }
        }
    }
}
