//! Endpoint reachability sentinel library.

pub mod alerting;
pub mod config;
pub mod endpoint;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod reconcile;
pub mod store;

pub use config::SentinelConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use reconcile::{BatchRunner, Outcome, Reconciler, Tag};
