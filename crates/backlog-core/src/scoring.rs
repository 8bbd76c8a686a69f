//! The scoring engine.
//!
//! Sums the points of the selected options, then maps the total onto the
//! questionnaire's complexity and time-estimate bands. Everything here is
//! pure: no I/O, no shared state, same inputs give the same outputs.
//!
//! Answers are matched to questions by position. An empty, missing, or
//! unknown answer contributes zero and is never an error, since stale or
//! partially completed answer sets are expected.

use serde::{Deserialize, Serialize};

use crate::model::{Question, Questionnaire, ScoringScale};

/// Total score plus the labels derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u64,
    pub complexity: String,
    pub estimated_time: String,
}

/// The labels a score maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub complexity: &'a str,
    pub estimated_time: &'a str,
}

/// How a single answer was scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The answer matched an option label.
    Matched,
    /// No answer at this position, or an empty string.
    Unanswered,
    /// The answer matched none of the question's labels.
    Unmatched,
}

/// Per-question contribution to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub question_id: String,
    pub selected: Option<String>,
    pub points: u32,
    pub outcome: AnswerOutcome,
}

fn score_answer(question: &Question, selected: Option<&str>) -> (u32, AnswerOutcome) {
    match selected {
        None | Some("") => (0, AnswerOutcome::Unanswered),
        Some(label) => match question.option(label) {
            Some(option) => (option.score, AnswerOutcome::Matched),
            None => {
                tracing::debug!(
                    question = %question.id,
                    answer = label,
                    "no option matches answer, scoring 0"
                );
                (0, AnswerOutcome::Unmatched)
            }
        },
    }
}

/// Sum of the option scores selected by `answers`.
///
/// `answers[i]` is matched against `questionnaire.questions()[i]`; entries
/// past the last question are ignored.
pub fn compute_score<S: AsRef<str>>(questionnaire: &Questionnaire, answers: &[S]) -> u64 {
    questionnaire
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let selected: Option<&str> = answers.get(i).map(AsRef::as_ref);
            u64::from(score_answer(question, selected).0)
        })
        .sum()
}

/// Per-question view of [`compute_score`]; the points always add up to it.
pub fn score_breakdown<S: AsRef<str>>(
    questionnaire: &Questionnaire,
    answers: &[S],
) -> Vec<AnswerScore> {
    questionnaire
        .questions()
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let selected: Option<&str> = answers.get(i).map(AsRef::as_ref);
            let (points, outcome) = score_answer(question, selected);
            AnswerScore {
                question_id: question.id.clone(),
                selected: selected.filter(|s| !s.is_empty()).map(str::to_string),
                points,
                outcome,
            }
        })
        .collect()
}

/// Map a score onto the complexity and time-estimate bands of `scale`.
pub fn classify(scale: &ScoringScale, score: u64) -> Classification<'_> {
    Classification {
        complexity: scale.complexity.classify(score),
        estimated_time: scale.estimated_time.classify(score),
    }
}

/// Score `answers` and label the total with the questionnaire's own scale.
pub fn evaluate<S: AsRef<str>>(questionnaire: &Questionnaire, answers: &[S]) -> ScoreResult {
    let score = compute_score(questionnaire, answers);
    let labels = classify(questionnaire.scale(), score);
    ScoreResult {
        score,
        complexity: labels.complexity.to_string(),
        estimated_time: labels.estimated_time.to_string(),
    }
}
