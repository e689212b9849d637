//! Endpoint alerting state machine.
//!
//! # States
//! - Healthy: no open incident, no failures counted
//! - Degrading: no open incident, failures counted but below threshold
//! - Incident: an incident is open for the current outage
//!
//! # State Transitions
//! ```text
//! Healthy   --fail-->  Degrading   (counter < threshold)
//! Healthy   --fail-->  Incident    (counter >= threshold, alerting on)
//! Degrading --fail-->  Incident    (counter >= threshold, alerting on)
//! Degrading --ok---->  Healthy     (counter reset)
//! Incident  --ok---->  Healthy     (incident resolved, counter reset)
//! Incident  --fail-->  Incident    (no second incident)
//! ```
//!
//! # Design Decisions
//! - Planning is pure; the engine performs every side effect
//! - Threshold comparison is `>=`, so threshold 0 alerts on the first failure
//! - With alerting disabled the counter keeps climbing and nothing opens

use serde::Serialize;

use crate::endpoint::state::EndpointState;
use crate::probe::ProbeResult;

/// Alerting phase derived from a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Healthy,
    Degrading,
    Incident,
}

impl Phase {
    pub fn of(state: &EndpointState) -> Self {
        if state.open_incident_id.is_some() {
            Phase::Incident
        } else if state.consequent_failures_current > 0 {
            Phase::Degrading
        } else {
            Phase::Healthy
        }
    }
}

/// What the engine has to do for one probe result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Reachable and nothing to reset. No write.
    StayHealthy,
    /// Reachable after failures: reset the counter and persist.
    Recover,
    /// Reachable while an incident is open: resolve it, then reset.
    Resolve { incident_id: String },
    /// Unreachable with alerting disabled: persist the incremented counter.
    Count,
    /// Unreachable with an incident already open: re-persist as is.
    Hold,
    /// Unreachable but below threshold: persist the incremented counter.
    Suppress,
    /// Unreachable and threshold reached: open an incident.
    Open { service_reference: String },
}

/// Decide the transition for `state` given the latest probe.
pub fn plan(state: &EndpointState, probe: ProbeResult) -> Plan {
    match probe {
        ProbeResult::Reachable => match &state.open_incident_id {
            Some(id) => Plan::Resolve {
                incident_id: id.clone(),
            },
            None if state.consequent_failures_current > 0 => Plan::Recover,
            None => Plan::StayHealthy,
        },
        ProbeResult::Unreachable => match (&state.service_reference, &state.open_incident_id) {
            (None, _) => Plan::Count,
            (Some(_), Some(_)) => Plan::Hold,
            (Some(service), None)
                if failures_after(state) >= state.consequent_failures_threshold =>
            {
                Plan::Open {
                    service_reference: service.clone(),
                }
            }
            (Some(_), None) => Plan::Suppress,
        },
    }
}

/// Counter value after recording one more failure.
pub fn failures_after(state: &EndpointState) -> u32 {
    state.consequent_failures_current.saturating_add(1)
}
