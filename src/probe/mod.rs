//! Reachability probing.
//!
//! # Data Flow
//! ```text
//! Reconciliation engine
//!     → Prober::probe(url, timeout)
//!     → http.rs (one GET, bounded by timeout)
//!     → ProbeResult::{Reachable, Unreachable}
//! ```
//!
//! # Design Decisions
//! - Unreachability is a result, not an error
//! - A timeout is an ordinary failure
//! - No retries within a pass

use std::time::Duration;

use async_trait::async_trait;

pub mod http;

pub use http::HttpProber;

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Reachable,
    Unreachable,
}

impl ProbeResult {
    pub fn is_reachable(self) -> bool {
        self == ProbeResult::Reachable
    }
}

/// Issues one bounded reachability check.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str, timeout: Duration) -> ProbeResult;
}
