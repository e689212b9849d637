//! Directory-backed store: one JSON document per handle.
//!
//! ```text
//! <root>/
//!     web.json
//!     api-eu.json
//! ```
//!
//! Writes go to a hidden temp file first and are renamed into place, so a
//! crash mid-write leaves the previous record intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::endpoint::EndpointState;
use crate::store::{validate_handle, StateStore, StoreError, StoreResult};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(path = ?root, "State store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, handle: &str) -> PathBuf {
        self.root.join(format!("{handle}.{EXTENSION}"))
    }

    fn temp_path(&self, handle: &str) -> PathBuf {
        self.root.join(format!(".{handle}.{EXTENSION}.tmp"))
    }
}

#[async_trait]
impl StateStore for FileStore {
    async fn get(&self, handle: &str) -> StoreResult<EndpointState> {
        validate_handle(handle)?;

        let bytes = match fs::read(self.record_path(handle)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(handle.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Codec {
            handle: handle.to_string(),
            reason: e.to_string(),
        })
    }

    async fn list_handles(&self) -> StoreResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut handles = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_handle(stem).is_ok() {
                handles.push(stem.to_string());
            } else {
                tracing::warn!(path = ?path, "Skipping state file with unusable name");
            }
        }

        handles.sort();
        Ok(handles)
    }

    async fn set(&self, handle: &str, state: &EndpointState) -> StoreResult<()> {
        validate_handle(handle)?;

        let bytes = serde_json::to_vec_pretty(state).map_err(|e| StoreError::Codec {
            handle: handle.to_string(),
            reason: e.to_string(),
        })?;

        let temp = self.temp_path(handle);
        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, self.record_path(handle)).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                tracing::warn!(path = ?temp, error = %cleanup, "Could not remove temp state file");
            }
            return Err(e.into());
        }

        tracing::debug!(handle = %handle, "State record written");
        Ok(())
    }
}
