//! Startup wiring.
//!
//! # Responsibilities
//! - Build the production collaborators from config
//! - Inject them into the reconciler and batch runner
//!
//! # Design Decisions
//! - Missing credentials do not prevent startup; each pass checks them
//! - Client construction is offline; nothing is contacted here

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::alerting::{AlertingError, PagerDutyClient};
use crate::config::SentinelConfig;
use crate::observability::Metrics;
use crate::probe::HttpProber;
use crate::reconcile::{BatchRunner, Reconciler};
use crate::store::{FileStore, StoreError};

/// Errors that prevent the sentinel from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("State store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Alerting client: {0}")]
    Alerting(#[from] AlertingError),

    #[error("Probe client: {0}")]
    Probe(#[from] reqwest::Error),
}

/// Build a batch runner backed by the file store, PagerDuty and StatsD.
pub fn build_runner(config: Arc<SentinelConfig>) -> Result<BatchRunner, StartupError> {
    let store = Arc::new(FileStore::open(&config.store.path)?);
    let prober = Arc::new(HttpProber::new(&config.probe.user_agent)?);
    let incidents = Arc::new(PagerDutyClient::new(&config.alerting)?);
    let metrics = Arc::new(Metrics::new(&config.metrics));

    let reconciler = Reconciler::new(store, prober, incidents, metrics)
        .with_probe_timeout(Duration::from_millis(config.probe.timeout_ms));

    tracing::info!(
        store = %config.store.path,
        alerting = %config.alerting.api_url,
        probe_timeout_ms = config.probe.timeout_ms,
        "Reconciler initialized"
    );

    Ok(BatchRunner::new(reconciler, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_runner_creates_store_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SentinelConfig::default();
        config.store.path = dir.path().join("endpoints").to_string_lossy().into_owned();

        let runner = build_runner(Arc::new(config)).unwrap();
        assert!(dir.path().join("endpoints").is_dir());
        assert!(runner.reconciler().store().list_handles().await.unwrap().is_empty());
    }
}
