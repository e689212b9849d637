//! Durable endpoint state.
//!
//! # Data Flow
//! ```text
//! Batch runner → list_handles()
//! Engine       → get(handle) → EndpointState
//!              → set(handle, state) (full overwrite)
//! ```
//!
//! # Design Decisions
//! - Whole-record overwrite, last write wins
//! - Records are created out of band; the store never invents one
//! - Handles are restricted to `[A-Za-z0-9_.-]`, no leading dot, so they
//!   map to plain file names

use async_trait::async_trait;
use thiserror::Error;

use crate::endpoint::EndpointState;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur while reading or writing endpoint state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the handle.
    #[error("No state record for handle '{0}'")]
    NotFound(String),

    /// Handle contains characters that cannot be stored.
    #[error("Invalid endpoint handle '{0}'")]
    InvalidHandle(String),

    /// Underlying I/O failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded.
    #[error("Malformed state record for '{handle}': {reason}")]
    Codec { handle: String, reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store of endpoint records.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the record for `handle`.
    async fn get(&self, handle: &str) -> StoreResult<EndpointState>;

    /// All known handles, sorted.
    async fn list_handles(&self) -> StoreResult<Vec<String>>;

    /// Overwrite the record for `handle`.
    async fn set(&self, handle: &str, state: &EndpointState) -> StoreResult<()>;
}

/// Check that a handle is safe to use as a storage key.
pub fn validate_handle(handle: &str) -> StoreResult<()> {
    let valid = !handle.is_empty()
        && !handle.starts_with('.')
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidHandle(handle.to_string()))
    }
}
