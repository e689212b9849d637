//! In-memory store for tests and dry runs.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::endpoint::EndpointState;
use crate::store::{validate_handle, StateStore, StoreError, StoreResult};

/// A thread-safe map of handle → record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, EndpointState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a record directly.
    pub fn insert(&self, handle: impl Into<String>, state: EndpointState) {
        self.inner.insert(handle.into(), state);
    }

    /// Current record, if any.
    pub fn snapshot(&self, handle: &str) -> Option<EndpointState> {
        self.inner.get(handle).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, handle: &str) -> StoreResult<EndpointState> {
        validate_handle(handle)?;
        self.snapshot(handle)
            .ok_or_else(|| StoreError::NotFound(handle.to_string()))
    }

    async fn list_handles(&self) -> StoreResult<Vec<String>> {
        let mut handles: Vec<String> = self.inner.iter().map(|r| r.key().clone()).collect();
        handles.sort();
        Ok(handles)
    }

    async fn set(&self, handle: &str, state: &EndpointState) -> StoreResult<()> {
        validate_handle(handle)?;
        self.inner.insert(handle.to_string(), state.clone());
        Ok(())
    }
}
