//! Periodic reconciliation passes.
//!
//! # Responsibilities
//! - Run a pass on a fixed interval
//! - Stop cleanly on shutdown

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::reconcile::batch::BatchRunner;

pub struct Scheduler {
    runner: BatchRunner,
    config: ScheduleConfig,
}

impl Scheduler {
    pub fn new(runner: BatchRunner, config: ScheduleConfig) -> Self {
        Self { runner, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Scheduled passes disabled");
            return;
        }

        tracing::info!(interval = self.config.interval_secs, "Scheduler starting");

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        // A slow pass delays the next one instead of queueing a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.runner.reconcile_all().await;
                    if !report.outcome.is_ok() {
                        tracing::warn!(run_id = %report.run_id, outcome = %report.outcome, "Scheduled pass failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
