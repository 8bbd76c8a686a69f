//! Request service: the shared CRUD layer every adapter calls into.
//!
//! Combines a [`RequestStore`], the questionnaire, and optional rate limiters.
//! Scores are recomputed from the answers on every write, so persisted
//! labels never drift from the answers stored next to them.

use std::sync::Arc;

use chrono::Utc;

use crate::error::ServiceError;
use crate::model::Questionnaire;
use crate::record::{
    ListQuery, NewRequest, RequestDraft, RequestId, RequestUpdate, StoredRequest,
};
use crate::scoring::{self, ScoreResult};
use crate::traits::{RateLimiter, RequestStore, UpdateFn};

/// What a caller is doing, for rate-limit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Create, update and delete count against the write limit.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Operation::Create | Operation::Update | Operation::Delete
        )
    }
}

/// Rate-limit rules applied by the service.
///
/// `general` sees every operation under the key `general:{client}`; `write`
/// additionally sees writes under `write:{client}`.
#[derive(Clone, Default)]
pub struct RateLimits {
    pub general: Option<Arc<dyn RateLimiter>>,
    pub write: Option<Arc<dyn RateLimiter>>,
}

/// The request service.
pub struct RequestService {
    store: Arc<dyn RequestStore>,
    questionnaire: Arc<Questionnaire>,
    limits: RateLimits,
}

impl RequestService {
    pub fn new(store: Arc<dyn RequestStore>, questionnaire: Arc<Questionnaire>) -> Self {
        Self {
            store,
            questionnaire,
            limits: RateLimits::default(),
        }
    }

    pub fn with_rate_limits(mut self, limits: RateLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Score an answer set without persisting anything.
    pub fn preview<S: AsRef<str>>(&self, answers: &[S]) -> ScoreResult {
        scoring::evaluate(&self.questionnaire, answers)
    }

    fn admit(&self, client: &str, operation: Operation) -> Result<(), ServiceError> {
        let now = Utc::now();
        let rules = [
            ("general", self.limits.general.as_ref(), true),
            ("write", self.limits.write.as_ref(), operation.is_write()),
        ];

        for (scope, limiter, applies) in rules {
            let Some(limiter) = limiter.filter(|_| applies) else {
                continue;
            };
            let decision = limiter.check_at(&format!("{scope}:{client}"), now);
            if !decision.allowed {
                let retry_after_ms = decision.retry_after_ms(now);
                tracing::warn!(
                    client,
                    scope,
                    ?operation,
                    retry_after_ms,
                    "rate limit exceeded"
                );
                return Err(ServiceError::RateLimited {
                    retry_after_ms,
                    remaining: decision.remaining,
                });
            }
            tracing::debug!(client, scope, remaining = decision.remaining, "rate limit checked");
        }
        Ok(())
    }

    /// All requests matching `query`, highest score first by default.
    pub async fn list(
        &self,
        client: &str,
        query: &ListQuery,
    ) -> Result<Vec<StoredRequest>, ServiceError> {
        self.admit(client, Operation::List)?;
        let requests = self.store.list().await?;
        Ok(query.apply(requests))
    }

    /// A single request.
    pub async fn get(&self, client: &str, id: RequestId) -> Result<StoredRequest, ServiceError> {
        self.admit(client, Operation::Get)?;
        self.store
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Score and persist a new request.
    pub async fn create(
        &self,
        client: &str,
        request: NewRequest,
    ) -> Result<StoredRequest, ServiceError> {
        let title = validate_title(&request.title)?;
        self.admit(client, Operation::Create)?;

        let result = scoring::evaluate(&self.questionnaire, &request.answers);
        let stored = self
            .store
            .insert(RequestDraft::new(title, request.answers, result))
            .await?;

        tracing::info!(
            id = stored.id,
            score = stored.score,
            complexity = %stored.complexity,
            "request created"
        );
        Ok(stored)
    }

    /// Apply `update` to a request and rescore it.
    ///
    /// Supplied answers replace the stored answer set entirely.
    pub async fn update(
        &self,
        client: &str,
        id: RequestId,
        update: RequestUpdate,
    ) -> Result<StoredRequest, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::Validation(
                "update must set a title or answers".into(),
            ));
        }
        let title = update.title.as_deref().map(validate_title).transpose()?;
        self.admit(client, Operation::Update)?;

        let questionnaire = Arc::clone(&self.questionnaire);
        let answers = update.answers;
        let apply: UpdateFn = Box::new(move |current| {
            let title = title.unwrap_or_else(|| current.title.clone());
            let answers = answers.unwrap_or_else(|| current.answers.clone());
            let result = scoring::evaluate(&questionnaire, &answers);
            RequestDraft::new(title, answers, result)
        });

        let stored = self
            .store
            .update(id, apply)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        tracing::info!(
            id = stored.id,
            score = stored.score,
            complexity = %stored.complexity,
            "request updated"
        );
        Ok(stored)
    }

    /// Delete a request. Deleting an unknown id succeeds; the result says
    /// whether anything was removed.
    pub async fn delete(&self, client: &str, id: RequestId) -> Result<bool, ServiceError> {
        self.admit(client, Operation::Delete)?;
        let removed = self.store.delete(id).await?;
        if removed {
            tracing::info!(id, "request deleted");
        } else {
            tracing::debug!(id, "delete of unknown request ignored");
        }
        Ok(removed)
    }
}

fn validate_title(title: &str) -> Result<String, ServiceError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("title is required".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;

    use crate::error::StoreError;
    use crate::traits::RateDecision;

    /// A store whose backing file is always unreadable.
    struct BrokenStore;

    fn corrupt() -> StoreError {
        StoreError::Corrupt {
            path: PathBuf::from("/var/lib/backlog/requests.json"),
            message: "expected value at line 1".into(),
        }
    }

    #[async_trait]
    impl RequestStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn list(&self) -> Result<Vec<StoredRequest>, StoreError> {
            Err(corrupt())
        }

        async fn get(&self, _id: RequestId) -> Result<Option<StoredRequest>, StoreError> {
            Err(corrupt())
        }

        async fn insert(&self, _draft: RequestDraft) -> Result<StoredRequest, StoreError> {
            Err(corrupt())
        }

        async fn update(
            &self,
            _id: RequestId,
            _apply: UpdateFn,
        ) -> Result<Option<StoredRequest>, StoreError> {
            Err(corrupt())
        }

        async fn delete(&self, _id: RequestId) -> Result<bool, StoreError> {
            Err(corrupt())
        }
    }

    /// Records every key it is asked about and allows everything.
    #[derive(Default)]
    struct RecordingLimiter {
        keys: Mutex<Vec<String>>,
    }

    impl RateLimiter for RecordingLimiter {
        fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
            self.keys.lock().unwrap().push(key.to_string());
            RateDecision {
                allowed: true,
                remaining: 1,
                reset_at: now,
            }
        }
    }

    fn broken_service() -> RequestService {
        RequestService::new(Arc::new(BrokenStore), Arc::new(Questionnaire::builtin()))
    }

    #[tokio::test]
    async fn store_failures_surface_as_internal_errors() {
        let service = broken_service();
        let err = service
            .list("client", &ListQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_body()["error"], "internal server error");

        let err = service
            .create(
                "client",
                NewRequest {
                    title: "Anything".into(),
                    answers: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn rate_limit_keys_are_scoped_per_rule() {
        let general = Arc::new(RecordingLimiter::default());
        let write = Arc::new(RecordingLimiter::default());
        let service = broken_service().with_rate_limits(RateLimits {
            general: Some(general.clone()),
            write: Some(write.clone()),
        });

        let _ = service.get("10.0.0.1", 1).await;
        let _ = service.delete("10.0.0.1", 1).await;

        assert_eq!(
            *general.keys.lock().unwrap(),
            vec!["general:10.0.0.1", "general:10.0.0.1"]
        );
        assert_eq!(*write.keys.lock().unwrap(), vec!["write:10.0.0.1"]);
    }

    #[test]
    fn preview_does_not_touch_the_store() {
        let result = broken_service()
            .preview(&["Yes, standard API, already used by lot of other clients"]);
        assert_eq!(result.score, 100);
        assert_eq!(result.complexity, "Low Complexity");
    }

    #[test]
    fn write_operations() {
        assert!(Operation::Create.is_write());
        assert!(Operation::Update.is_write());
        assert!(Operation::Delete.is_write());
        assert!(!Operation::List.is_write());
        assert!(!Operation::Get.is_write());
    }

    #[test]
    fn title_validation() {
        assert_eq!(validate_title("  Export to CSV ").unwrap(), "Export to CSV");
        assert!(matches!(
            validate_title("   "),
            Err(ServiceError::Validation(_))
        ));
        assert!(validate_title("").is_err());
    }
}
