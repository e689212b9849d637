//! Reconciliation passes over every configured endpoint.
//!
//! # Responsibilities
//! - Refuse to start without the required alerting/metrics settings
//! - Reconcile every handle in order, one at a time
//! - Keep going when a single endpoint fails
//! - Aggregate per-endpoint outcomes into one pass result

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::validation::validate_required;
use crate::config::SentinelConfig;
use crate::reconcile::engine::Reconciler;
use crate::reconcile::outcome::{Outcome, Tag};

/// Result of one endpoint within a pass.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub handle: String,
    pub outcome: Outcome,
}

/// Result of a whole pass.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub run_id: Uuid,
    pub outcome: Outcome,
    pub endpoints: Vec<EndpointReport>,
}

impl PassReport {
    fn aborted(run_id: Uuid, tag: Tag) -> Self {
        Self {
            run_id,
            outcome: Outcome::Failed(tag),
            endpoints: Vec::new(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.endpoints.iter().filter(|e| !e.outcome.is_ok()).count()
    }
}

/// Runs reconciliation passes.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    reconciler: Reconciler,
    config: Arc<SentinelConfig>,
}

impl BatchRunner {
    pub fn new(reconciler: Reconciler, config: Arc<SentinelConfig>) -> Self {
        Self { reconciler, config }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Reconcile every stored endpoint once.
    pub async fn reconcile_all(&self) -> PassReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pass", run_id = %run_id);
        self.run_pass(run_id).instrument(span).await
    }

    /// Reconcile a single endpoint, with the same preflight as a full pass.
    pub async fn reconcile_one(&self, handle: &str) -> Outcome {
        if !self.preflight() {
            return Outcome::Failed(Tag::ConfigurationError);
        }
        self.reconciler.reconcile(handle).await
    }

    fn preflight(&self) -> bool {
        match validate_required(&self.config) {
            Ok(()) => true,
            Err(errors) => {
                for error in &errors {
                    tracing::error!(error = %error, "Missing required configuration");
                }
                false
            }
        }
    }

    async fn run_pass(&self, run_id: Uuid) -> PassReport {
        if !self.preflight() {
            return PassReport::aborted(run_id, Tag::ConfigurationError);
        }

        let start = Instant::now();
        let handles = match self.reconciler.store().list_handles().await {
            Ok(handles) => handles,
            Err(e) => {
                tracing::error!(error = %e, "Could not list endpoint handles");
                return PassReport::aborted(run_id, Tag::DbReadFailed);
            }
        };

        tracing::info!(endpoints = handles.len(), "Reconciliation pass starting");

        let mut endpoints = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = self.reconciler.reconcile(&handle).await;
            endpoints.push(EndpointReport { handle, outcome });
        }

        let failed = endpoints.iter().filter(|e| !e.outcome.is_ok()).count();
        let outcome = if failed > 0 && self.config.batch.fail_on_partial {
            Outcome::Failed(Tag::PartialFailure)
        } else {
            Outcome::Ok(Tag::PassOk)
        };

        self.reconciler.metrics().timing("pass", start);
        tracing::info!(
            endpoints = endpoints.len(),
            failed,
            outcome = %outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Reconciliation pass finished"
        );

        PassReport {
            run_id,
            outcome,
            endpoints,
        }
    }
}
