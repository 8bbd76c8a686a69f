//! JSON file request store.
//!
//! The whole backlog lives in one JSON document:
//!
//! ```json
//! { "nextId": 3, "requests": [ { "id": 1, "title": "...", ... } ] }
//! ```
//!
//! Reads never lock: the file is only ever replaced by an atomic rename, so
//! a reader sees a complete document. Writes hold an in-process mutex and a
//! cross-process lock on `<file>.lock` for the full read-modify-write cycle,
//! so separate `backlog` invocations sharing one file never lose an insert.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use backlog_core::error::StoreError;
use backlog_core::record::{RequestDraft, RequestId, StoredRequest};
use backlog_core::traits::{RequestStore, UpdateFn};

use crate::state_file;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    #[serde(default = "first_id")]
    next_id: RequestId,
    #[serde(default)]
    requests: Vec<StoredRequest>,
}

fn first_id() -> RequestId {
    1
}

impl StoreFile {
    fn empty() -> Self {
        Self {
            next_id: first_id(),
            requests: Vec::new(),
        }
    }
}

/// Result of a write transaction.
enum Change<T> {
    /// The document changed and must be written back.
    Saved(T),
    Unchanged(T),
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn load(path: &Path) -> Result<StoreFile, StoreError> {
    let Some(content) = state_file::read_optional(path).map_err(|e| io_error(path, e))? else {
        return Ok(StoreFile::empty());
    };

    let mut file: StoreFile = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // Never hand out an id that is already taken, even if nextId was edited by hand.
    let floor = file.requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    file.next_id = file.next_id.max(floor);
    file.requests.sort_by_key(|r| r.id);
    Ok(file)
}

fn save(path: &Path, file: &StoreFile) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(file)?;
    state_file::write_atomic(path, json.as_bytes()).map_err(|e| io_error(path, e))
}

/// A `RequestStore` persisted to a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// The file is created on the first write; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Path) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(&path))
            .await
            .map_err(|e| io_error(&self.path, std::io::Error::other(e)))?
    }

    async fn read(&self) -> Result<StoreFile, StoreError> {
        self.blocking(load).await
    }

    /// Run `op` against the current document under both locks.
    async fn transact<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreFile) -> Change<T> + Send + 'static,
        T: Send + 'static,
    {
        let _guard = self.lock.lock().await;
        self.blocking(move |path| {
            let mut lock = state_file::open_lock(path).map_err(|e| io_error(path, e))?;
            let _held = lock.write().map_err(|e| io_error(path, e))?;

            let mut file = load(path)?;
            match op(&mut file) {
                Change::Saved(value) => {
                    save(path, &file)?;
                    Ok(value)
                }
                Change::Unchanged(value) => Ok(value),
            }
        })
        .await
    }
}

#[async_trait]
impl RequestStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError> {
        Ok(self.read().await?.requests)
    }

    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        let file = self.read().await?;
        Ok(file.requests.into_iter().find(|r| r.id == id))
    }

    async fn insert(&self, draft: RequestDraft) -> Result<StoredRequest, StoreError> {
        let stored = self
            .transact(move |file| {
                let stored = StoredRequest::from_draft(file.next_id, Utc::now(), draft);
                file.next_id += 1;
                file.requests.push(stored.clone());
                Change::Saved(stored)
            })
            .await?;
        tracing::debug!(id = stored.id, path = %self.path.display(), "request written");
        Ok(stored)
    }

    async fn update(
        &self,
        id: RequestId,
        apply: UpdateFn,
    ) -> Result<Option<StoredRequest>, StoreError> {
        self.transact(move |file| {
            let Some(current) = file.requests.iter_mut().find(|r| r.id == id) else {
                return Change::Unchanged(None);
            };
            let draft = apply(current);
            *current = StoredRequest::from_draft(current.id, current.created_at, draft);
            Change::Saved(Some(current.clone()))
        })
        .await
    }

    async fn delete(&self, id: RequestId) -> Result<bool, StoreError> {
        self.transact(move |file| {
            let before = file.requests.len();
            file.requests.retain(|r| r.id != id);
            if file.requests.len() == before {
                Change::Unchanged(false)
            } else {
                Change::Saved(true)
            }
        })
        .await
    }
}
