//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, timers)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → StatsD collector (UDP)
//!     → Metrics endpoint (Prometheus scrape, serve mode only)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Every pass runs inside a span carrying its run id
//! - Metrics can never fail a reconciliation

pub mod logging;
pub mod metrics;

pub use self::metrics::{Metrics, MetricsEmitter};
