//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Trigger (HTTP, scheduler, CLI)
//!     → batch.rs (preflight, list handles)
//!     → engine.rs, per handle, sequentially:
//!         store.get → prober.probe → phase plan
//!         → incident client (if needed) → store.set
//!     → Outcome per handle → PassReport
//! ```
//!
//! # Design Decisions
//! - No parallel fan-out; one endpoint finishes before the next starts
//! - No retries; the next pass starts again from persisted state
//! - A pass reports success by default even if endpoints failed
//!   (`batch.fail_on_partial` changes that)

pub mod batch;
pub mod engine;
pub mod outcome;
pub mod schedule;

pub use batch::{BatchRunner, EndpointReport, PassReport};
pub use engine::Reconciler;
pub use outcome::{Outcome, Tag};
pub use schedule::Scheduler;
