//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (PAGERDUTY_*, STATSD_*)
//!     → validation.rs (semantic checks)
//!     → SentinelConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! Before every reconciliation pass:
//!     validation.rs checks required credentials
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AlertingConfig, BatchConfig, MetricsConfig, ObservabilityConfig, ProbeConfig,
    ScheduleConfig, SentinelConfig, ServerConfig, StoreConfig,
};
