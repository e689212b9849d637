//! Incident management integration.
//!
//! # Data Flow
//! ```text
//! Reconciliation engine
//!     → key.rs (random incident key)
//!     → IncidentClient::open / resolve
//!     → client.rs (PagerDuty REST v2)
//! ```
//!
//! # Security Constraints
//! - API token only from config file or environment
//! - Token header marked sensitive; never logged

use async_trait::async_trait;

pub mod client;
pub mod key;
pub mod types;

pub use client::PagerDutyClient;
pub use key::incident_key;
pub use types::{AlertingError, AlertingResult, IncidentRequest};

/// Opens and resolves incidents in the external alerting system.
#[async_trait]
pub trait IncidentClient: Send + Sync {
    /// Open an incident and return the id assigned by the alerting system.
    async fn open(&self, request: &IncidentRequest) -> AlertingResult<String>;

    /// Resolve an incident. Resolving an already resolved incident succeeds.
    async fn resolve(&self, incident_id: &str) -> AlertingResult<()>;
}
