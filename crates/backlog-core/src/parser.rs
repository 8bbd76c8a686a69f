//! TOML questionnaire parser.
//!
//! Loads a questionnaire definition from a TOML file and validates it.
//! Structural problems (duplicate labels, broken band tables) are errors;
//! cosmetic ones are reported as [`ValidationWarning`]s.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Band, BandTable, Question, QuestionOption, Questionnaire, ScoringScale};
use crate::questionnaire;

/// Intermediate TOML structure for parsing questionnaire files.
#[derive(Debug, Deserialize)]
struct TomlQuestionnaireFile {
    questionnaire: TomlQuestionnaireHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    complexity_bands: Option<Vec<TomlBand>>,
    #[serde(default)]
    time_bands: Option<Vec<TomlBand>>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestionnaireHeader {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    label: String,
    score: u32,
}

#[derive(Debug, Deserialize)]
struct TomlBand {
    #[serde(default)]
    max: Option<u64>,
    label: String,
}

fn band_table(bands: Option<Vec<TomlBand>>, fallback: fn() -> Vec<Band>) -> Result<BandTable> {
    let bands = match bands {
        Some(bands) => bands
            .into_iter()
            .map(|b| Band {
                max: b.max,
                label: b.label,
            })
            .collect(),
        None => fallback(),
    };
    Ok(BandTable::new(bands)?)
}

/// Parse a single TOML file into a `Questionnaire`.
pub fn parse_questionnaire(path: &Path) -> Result<Questionnaire> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read questionnaire file: {}", path.display()))?;

    parse_questionnaire_str(&content, path)
}

/// Parse a TOML string into a `Questionnaire` (useful for testing).
pub fn parse_questionnaire_str(content: &str, source_path: &Path) -> Result<Questionnaire> {
    let parsed: TomlQuestionnaireFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let complexity = band_table(parsed.complexity_bands, questionnaire::complexity_bands)
        .with_context(|| format!("invalid complexity_bands in {}", source_path.display()))?;
    let estimated_time = band_table(parsed.time_bands, questionnaire::time_bands)
        .with_context(|| format!("invalid time_bands in {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            text: q.text,
            options: q
                .options
                .into_iter()
                .map(|o| QuestionOption {
                    label: o.label,
                    score: o.score,
                })
                .collect(),
        })
        .collect();

    Questionnaire::new(
        parsed.questionnaire.id,
        parsed.questionnaire.name,
        questions,
        ScoringScale {
            complexity,
            estimated_time,
        },
    )
    .with_context(|| format!("invalid questionnaire: {}", source_path.display()))
}

/// A warning from questionnaire validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a questionnaire for issues that do not break scoring.
pub fn validate_questionnaire(questionnaire: &Questionnaire) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for question in questionnaire.questions() {
        if !seen_ids.insert(question.id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in questionnaire.questions() {
        if question.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "question text is empty".into(),
            });
        }

        if question.options.len() == 1 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "question has a single option, so every answer scores the same".into(),
            });
        }

        for option in &question.options {
            if option.label.is_empty() {
                // An empty answer means "no selection", so this option can never match.
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: "option with an empty label can never be selected".into(),
                });
            } else if option.label.trim() != option.label {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "option label '{}' has surrounding whitespace; answers must match it exactly",
                        option.label
                    ),
                });
            }
        }
    }

    warnings
}
