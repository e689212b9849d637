//! Monitored endpoint model.
//!
//! # Data Flow
//! ```text
//! store (JSON document)
//!     → state.rs (EndpointState)
//!     → phase.rs (Healthy / Degrading / Incident, plan for a probe result)
//!     → reconcile engine applies the plan
//! ```

pub mod phase;
pub mod state;

pub use phase::{failures_after, plan, Phase, Plan};
pub use state::EndpointState;
