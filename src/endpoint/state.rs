//! Persisted per-endpoint record.

use serde::{Deserialize, Serialize};

use crate::endpoint::phase::Phase;

/// One monitored endpoint, keyed externally by its handle.
///
/// Records are provisioned out of band. Fields added after a record was
/// written decode to their defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointState {
    /// Reachability target.
    pub url: String,

    /// Label used in incident titles.
    pub server_name: String,

    /// Service in the alerting system. `None` disables incidents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_reference: Option<String>,

    /// Consecutive failures required before an incident is opened.
    #[serde(default)]
    pub consequent_failures_threshold: u32,

    /// Consecutive failures seen since the last success.
    #[serde(default)]
    pub consequent_failures_current: u32,

    /// Incident opened for the current outage, if any.
    #[serde(
        default,
        alias = "existingIncidentId",
        skip_serializing_if = "Option::is_none"
    )]
    pub open_incident_id: Option<String>,
}

impl EndpointState {
    /// A fresh record in the shape provisioning creates it.
    pub fn new(url: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            server_name: server_name.into(),
            service_reference: None,
            consequent_failures_threshold: 0,
            consequent_failures_current: 0,
            open_incident_id: None,
        }
    }

    pub fn with_service(mut self, service_reference: impl Into<String>) -> Self {
        self.service_reference = Some(service_reference.into());
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.consequent_failures_threshold = threshold;
        self
    }

    /// Whether incidents may be opened for this endpoint.
    pub fn alerting_enabled(&self) -> bool {
        self.service_reference.is_some()
    }

    pub fn phase(&self) -> Phase {
        Phase::of(self)
    }

    pub fn incident_title(&self) -> String {
        format!("{} is not available", self.server_name)
    }

    pub fn incident_details(&self) -> String {
        format!(
            "Server {} is not available. Check it & fix it.",
            self.server_name
        )
    }
}
