//! In-memory request store.
//!
//! Suitable for tests and for single long-lived processes; contents are
//! lost on exit.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use backlog_core::error::StoreError;
use backlog_core::record::{RequestDraft, RequestId, StoredRequest};
use backlog_core::traits::{RequestStore, UpdateFn};

struct State {
    next_id: RequestId,
    requests: BTreeMap<RequestId, StoredRequest>,
}

/// A `RequestStore` backed by a map behind an async `RwLock`.
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_requests(Vec::new())
    }

    /// Seed the store. New ids continue after the highest seeded id.
    pub fn with_requests(requests: Vec<StoredRequest>) -> Self {
        let next_id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let requests = requests.into_iter().map(|r| (r.id, r)).collect();
        Self {
            state: RwLock::new(State { next_id, requests }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError> {
        let state = self.state.read().await;
        Ok(state.requests.values().cloned().collect())
    }

    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id).cloned())
    }

    async fn insert(&self, draft: RequestDraft) -> Result<StoredRequest, StoreError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        let stored = StoredRequest::from_draft(id, Utc::now(), draft);
        state.requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: RequestId,
        apply: UpdateFn,
    ) -> Result<Option<StoredRequest>, StoreError> {
        let mut state = self.state.write().await;
        let Some(current) = state.requests.get_mut(&id) else {
            return Ok(None);
        };
        let draft = apply(current);
        *current = StoredRequest::from_draft(current.id, current.created_at, draft);
        Ok(Some(current.clone()))
    }

    async fn delete(&self, id: RequestId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.requests.remove(&id).is_some())
    }
}
