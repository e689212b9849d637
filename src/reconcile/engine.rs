//! Per-endpoint reconciliation.
//!
//! # Responsibilities
//! - Load the endpoint record
//! - Probe it once
//! - Apply the planned transition (incident open/resolve, counter update)
//! - Persist the new record and report an `Outcome`
//!
//! # Design Decisions
//! - Collaborators are injected as trait objects
//! - Collaborator errors are converted to `Outcome`s here and never escape
//! - An alerting call that succeeded is never hidden by a failed write; the
//!   combined tag reports both

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alerting::{incident_key, IncidentClient, IncidentRequest};
use crate::endpoint::phase::{failures_after, plan, Plan};
use crate::endpoint::EndpointState;
use crate::observability::MetricsEmitter;
use crate::probe::Prober;
use crate::reconcile::outcome::{Outcome, Tag};
use crate::store::{StateStore, StoreError};

/// Probe timeout used unless configured otherwise.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Reconciles one endpoint at a time against its collaborators.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn StateStore>,
    prober: Arc<dyn Prober>,
    incidents: Arc<dyn IncidentClient>,
    metrics: Arc<dyn MetricsEmitter>,
    probe_timeout: Duration,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn StateStore>,
        prober: Arc<dyn Prober>,
        incidents: Arc<dyn IncidentClient>,
        metrics: Arc<dyn MetricsEmitter>,
    ) -> Self {
        Self {
            store,
            prober,
            incidents,
            metrics,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsEmitter> {
        &self.metrics
    }

    /// Reconcile the endpoint stored under `handle`.
    pub async fn reconcile(&self, handle: &str) -> Outcome {
        let start = Instant::now();
        let outcome = self.reconcile_inner(handle).await;
        self.metrics.timing("reconcile", start);

        if outcome.is_ok() {
            tracing::info!(handle = %handle, outcome = %outcome, "Endpoint reconciled");
        } else {
            self.metrics.increment("outcome.failed");
            tracing::warn!(handle = %handle, outcome = %outcome, "Endpoint reconciliation failed");
        }
        outcome
    }

    async fn reconcile_inner(&self, handle: &str) -> Outcome {
        let mut state = match self.store.get(handle).await {
            Ok(state) => state,
            Err(StoreError::NotFound(_) | StoreError::InvalidHandle(_)) => {
                tracing::warn!(handle = %handle, "Could not find configuration for handle");
                return Outcome::Failed(Tag::HandleNotFound);
            }
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "Could not load endpoint state");
                return Outcome::Failed(Tag::DbReadFailed);
            }
        };

        tracing::debug!(
            handle = %handle,
            url = %state.url,
            phase = ?state.phase(),
            failures = state.consequent_failures_current,
            "Testing endpoint"
        );

        let probe_start = Instant::now();
        let probe = self.prober.probe(&state.url, self.probe_timeout).await;
        self.metrics.timing("probe", probe_start);
        self.metrics.increment(if probe.is_reachable() {
            "probe.ok"
        } else {
            "probe.failed"
        });

        match plan(&state, probe) {
            Plan::StayHealthy => Outcome::Ok(Tag::EndpointOk),

            Plan::Recover => {
                state.consequent_failures_current = 0;
                self.persist(handle, &state, Tag::EndpointOk, Tag::DbUpdateFailed)
                    .await
            }

            Plan::Resolve { incident_id } => {
                tracing::info!(handle = %handle, incident_id = %incident_id, "Endpoint recovered, resolving incident");
                if let Err(e) = self.incidents.resolve(&incident_id).await {
                    tracing::error!(handle = %handle, incident_id = %incident_id, error = %e, "Incident resolution failed");
                    self.metrics.increment("incident.resolve_failed");
                    return Outcome::Failed(Tag::IncidentResolutionFailed);
                }
                self.metrics.increment("incident.resolved");

                state.open_incident_id = None;
                state.consequent_failures_current = 0;
                self.persist(
                    handle,
                    &state,
                    Tag::IncidentResolved,
                    Tag::IncidentResolvedDbFailed,
                )
                .await
            }

            Plan::Count => {
                state.consequent_failures_current = failures_after(&state);
                self.persist(
                    handle,
                    &state,
                    Tag::IncidentsNotConfigured,
                    Tag::DbUpdateFailed,
                )
                .await
            }

            Plan::Hold => {
                self.persist(
                    handle,
                    &state,
                    Tag::IncidentAlreadyExists,
                    Tag::DbUpdateFailed,
                )
                .await
            }

            Plan::Suppress => {
                state.consequent_failures_current = failures_after(&state);
                tracing::info!(
                    handle = %handle,
                    failures = state.consequent_failures_current,
                    threshold = state.consequent_failures_threshold,
                    "Endpoint down, below incident threshold"
                );
                self.persist(handle, &state, Tag::NotEnoughFailures, Tag::DbUpdateFailed)
                    .await
            }

            Plan::Open { service_reference } => {
                state.consequent_failures_current = failures_after(&state);
                self.open_incident(handle, state, service_reference).await
            }
        }
    }

    async fn open_incident(
        &self,
        handle: &str,
        mut state: EndpointState,
        service_reference: String,
    ) -> Outcome {
        let request = IncidentRequest {
            title: state.incident_title(),
            details: state.incident_details(),
            service_reference,
            incident_key: incident_key(),
        };

        match self.incidents.open(&request).await {
            Ok(incident_id) => {
                tracing::info!(handle = %handle, incident_id = %incident_id, "Created new incident");
                self.metrics.increment("incident.created");
                state.open_incident_id = Some(incident_id);
                self.persist(
                    handle,
                    &state,
                    Tag::IncidentCreated,
                    Tag::IncidentCreatedDbFailed,
                )
                .await
            }
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "Incident creation failed");
                self.metrics.increment("incident.create_failed");
                // Keep the failure count so the next pass retries the open.
                if let Err(e) = self.store.set(handle, &state).await {
                    tracing::warn!(handle = %handle, error = %e, "Could not save failure count");
                }
                Outcome::Failed(Tag::IncidentCreationFailed)
            }
        }
    }

    async fn persist(
        &self,
        handle: &str,
        state: &EndpointState,
        on_success: Tag,
        on_failure: Tag,
    ) -> Outcome {
        match self.store.set(handle, state).await {
            Ok(()) => Outcome::Ok(on_success),
            Err(e) => {
                tracing::error!(handle = %handle, error = %e, "Couldn't update state in store");
                self.metrics.increment("db.update_failed");
                Outcome::Failed(on_failure)
            }
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}
