//! Error types for questionnaires, stores, and the request service.
//!
//! The scoring engine itself has no error path: unmatched answers score zero.

use std::path::PathBuf;

use thiserror::Error;

use crate::record::RequestId;

/// A questionnaire or band table that violates its structural invariants.
#[derive(Debug, Error)]
pub enum QuestionnaireError {
    #[error("questionnaire has no questions")]
    NoQuestions,

    #[error("question '{question_id}' has no options")]
    NoOptions { question_id: String },

    #[error("question '{question_id}' has duplicate option label '{label}'")]
    DuplicateOption { question_id: String, label: String },

    #[error("band table is empty")]
    EmptyBandTable,

    #[error("band bounds must be strictly ascending ({next} follows {previous})")]
    BandsNotAscending { previous: u64, next: u64 },

    #[error("open-ended band '{label}' must be the last band")]
    OpenBandNotLast { label: String },

    #[error("last band must be open-ended, but it stops at {last_max}")]
    MissingOpenBand { last_max: u64 },
}

/// Failures of a [`RequestStore`](crate::traits::RequestStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but does not hold a valid request list.
    #[error("corrupt store file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Records could not be encoded.
    #[error("failed to serialize requests")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by the [`RequestService`](crate::service::RequestService).
///
/// Each variant maps onto one transport status so adapters stay thin.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller sent an invalid payload.
    #[error("{0}")]
    Validation(String),

    /// No request with this id exists.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// The caller exceeded a rate-limit rule.
    #[error("rate limit exceeded, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64, remaining: u32 },

    /// The store failed.
    #[error("storage failure")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::RateLimited { .. } => 429,
            ServiceError::Store(_) => 500,
        }
    }

    /// JSON error body: `{"error": "..."}`.
    ///
    /// Store failures are reported generically; their detail goes to the log.
    /// Rate-limit rejections also carry `retryAfterMs` and `remaining`.
    pub fn error_body(&self) -> serde_json::Value {
        match self {
            ServiceError::Store(_) => serde_json::json!({ "error": "internal server error" }),
            ServiceError::RateLimited {
                retry_after_ms,
                remaining,
            } => serde_json::json!({
                "error": self.to_string(),
                "retryAfterMs": retry_after_ms,
                "remaining": remaining,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}
