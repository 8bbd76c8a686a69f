//! Collaborator traits: request persistence and rate limiting.
//!
//! Implemented by the `backlog-store` crate; the request service only sees
//! these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::record::{RequestDraft, RequestId, StoredRequest};

// ---------------------------------------------------------------------------
// Request store trait
// ---------------------------------------------------------------------------

/// Read-modify-write step for [`RequestStore::update`].
pub type UpdateFn = Box<dyn FnOnce(&StoredRequest) -> RequestDraft + Send>;

/// Persistence for backlog requests.
///
/// Implementations serialize their own mutations, so `update` is atomic with
/// respect to every other call on the same store.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Human-readable backend name (e.g. "memory").
    fn name(&self) -> &str;

    /// All requests in id order.
    async fn list(&self) -> Result<Vec<StoredRequest>, StoreError>;

    /// A single request, if it exists.
    async fn get(&self, id: RequestId) -> Result<Option<StoredRequest>, StoreError>;

    /// Persist a new request under the next serial id.
    async fn insert(&self, draft: RequestDraft) -> Result<StoredRequest, StoreError>;

    /// Replace a request with the draft computed by `apply` from its current
    /// state. The id and creation time are kept. `None` if the id is unknown.
    async fn update(
        &self,
        id: RequestId,
        apply: UpdateFn,
    ) -> Result<Option<StoredRequest>, StoreError>;

    /// Remove a request. Returns whether anything was removed.
    async fn delete(&self, id: RequestId) -> Result<bool, StoreError>;
}

// ---------------------------------------------------------------------------
// Rate limiter trait
// ---------------------------------------------------------------------------

/// How many requests a key may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Requests allowed per window.
    pub max_requests: u32,
}

impl RateLimitPolicy {
    /// Twenty requests per day.
    pub const DAILY_GENERAL: RateLimitPolicy = RateLimitPolicy {
        window_ms: 24 * 60 * 60 * 1000,
        max_requests: 20,
    };

    /// Ten writes per day.
    pub const DAILY_WRITES: RateLimitPolicy = RateLimitPolicy {
        window_ms: 24 * 60 * 60 * 1000,
        max_requests: 10,
    };
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
}

impl RateDecision {
    /// Milliseconds from `now` until the window resets (0 if already past).
    pub fn retry_after_ms(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((self.reset_at - now).num_milliseconds()).unwrap_or(0)
    }
}

/// Counts requests per key and decides whether another one is allowed.
pub trait RateLimiter: Send + Sync {
    /// Record a request for `key` at `now` and decide on it.
    fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision;

    /// Record a request for `key` at the current time.
    fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Utc::now())
    }
}
