//! backlog-report — HTML backlog report generation.

pub mod html;

use chrono::{DateTime, Utc};
use serde::Serialize;

use backlog_core::model::{Questionnaire, ScoringScale};
use backlog_core::record::StoredRequest;

/// Everything a backlog report shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogReport {
    pub questionnaire_name: String,
    pub generated_at: DateTime<Utc>,
    pub scale: ScoringScale,
    pub requests: Vec<StoredRequest>,
}

impl BacklogReport {
    /// Snapshot `requests` against the questionnaire's bands, highest score first.
    pub fn new(questionnaire: &Questionnaire, mut requests: Vec<StoredRequest>) -> Self {
        requests.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));
        Self {
            questionnaire_name: questionnaire.name().to_string(),
            generated_at: Utc::now(),
            scale: questionnaire.scale().clone(),
            requests,
        }
    }

    /// Number of requests per complexity band, in band order.
    pub fn complexity_counts(&self) -> Vec<(&str, usize)> {
        let table = &self.scale.complexity;
        let mut counts = vec![0usize; table.len()];
        for request in &self.requests {
            counts[table.band_index(request.score)] += 1;
        }
        table.labels().zip(counts).collect()
    }
}
