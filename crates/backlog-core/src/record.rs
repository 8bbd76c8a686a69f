//! Backlog request records and the inputs that produce them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreResult;

/// Serial identifier assigned by the store, starting at 1.
pub type RequestId = u64;

/// A persisted backlog request.
///
/// `score`, `complexity` and `estimated_time` are the values last computed
/// from `answers`; they are rewritten whenever the answers change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRequest {
    pub id: RequestId,
    pub title: String,
    pub answers: Vec<String>,
    pub score: u64,
    pub complexity: String,
    pub estimated_time: String,
    pub created_at: DateTime<Utc>,
}

impl StoredRequest {
    /// Assemble a record from a draft and the store-assigned fields.
    pub fn from_draft(id: RequestId, created_at: DateTime<Utc>, draft: RequestDraft) -> Self {
        Self {
            id,
            title: draft.title,
            answers: draft.answers,
            score: draft.score,
            complexity: draft.complexity,
            estimated_time: draft.estimated_time,
            created_at,
        }
    }
}

/// Everything a store persists except the id and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub title: String,
    pub answers: Vec<String>,
    pub score: u64,
    pub complexity: String,
    pub estimated_time: String,
}

impl RequestDraft {
    pub fn new(title: String, answers: Vec<String>, result: ScoreResult) -> Self {
        Self {
            title,
            answers,
            score: result.score,
            complexity: result.complexity,
            estimated_time: result.estimated_time,
        }
    }
}

/// Payload for creating a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub answers: Vec<String>,
}

/// Payload for updating a request. Absent fields keep their current value;
/// supplied answers replace the whole answer set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub answers: Option<Vec<String>>,
}

impl RequestUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.answers.is_none()
    }
}

/// Score ordering for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter and ordering for [`RequestService::list`](crate::service::RequestService::list).
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Keep only requests whose complexity label equals this (ASCII case-insensitive).
    pub complexity: Option<String>,
    pub sort: SortOrder,
}

impl ListQuery {
    /// Apply the filter and ordering. Ties on score keep id order.
    pub fn apply(&self, mut requests: Vec<StoredRequest>) -> Vec<StoredRequest> {
        if let Some(label) = &self.complexity {
            requests.retain(|r| r.complexity.eq_ignore_ascii_case(label));
        }
        match self.sort {
            SortOrder::Ascending => {
                requests.sort_by(|a, b| a.score.cmp(&b.score).then(a.id.cmp(&b.id)))
            }
            SortOrder::Descending => {
                requests.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)))
            }
        }
        requests
    }
}
