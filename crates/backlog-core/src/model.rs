//! Core data model types for the backlog estimator.
//!
//! A [`Questionnaire`] is an ordered list of [`Question`]s plus the
//! [`ScoringScale`] that turns a total score into labels. Questionnaires are
//! validated when they are built and never change afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::QuestionnaireError;

/// A selectable answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Display label. Answers are matched against it exactly.
    pub label: String,
    /// Points added to the total when this option is selected.
    pub score: u32,
}

impl QuestionOption {
    pub fn new(label: impl Into<String>, score: u32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A single question of the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier (e.g. "external_integration").
    pub id: String,
    /// Prompt shown to the user.
    pub text: String,
    /// Options in display order.
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options,
        }
    }

    /// Find the option whose label equals `label` exactly (case-sensitive).
    pub fn option(&self, label: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Highest score any single option of this question awards.
    pub fn max_score(&self) -> u32 {
        self.options.iter().map(|o| o.score).max().unwrap_or(0)
    }
}

/// One labeled score range as written in configuration.
///
/// `max` is an inclusive upper bound; `None` marks the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    pub label: String,
}

impl Band {
    pub fn up_to(max: u64, label: impl Into<String>) -> Self {
        Self {
            max: Some(max),
            label: label.into(),
        }
    }

    pub fn open(label: impl Into<String>) -> Self {
        Self {
            max: None,
            label: label.into(),
        }
    }
}

/// A band resolved to its full range, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandRange<'a> {
    pub min: u64,
    pub max: Option<u64>,
    pub label: &'a str,
}

impl BandRange<'_> {
    /// Human-readable range, e.g. "101-250" or "401+".
    pub fn describe(&self) -> String {
        match self.max {
            Some(max) => format!("{}-{}", self.min, max),
            None => format!("{}+", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoundedBand {
    max: u64,
    label: String,
}

/// An ordered, exhaustive mapping from scores to labels.
///
/// Bounds are inclusive and strictly ascending, and the table always ends
/// with an open band, so every score maps to exactly one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band>", into = "Vec<Band>")]
pub struct BandTable {
    bounded: Vec<BoundedBand>,
    open: String,
}

impl BandTable {
    /// Build a table from bands in ascending order.
    pub fn new(bands: Vec<Band>) -> Result<Self, QuestionnaireError> {
        let Some((last, rest)) = bands.split_last() else {
            return Err(QuestionnaireError::EmptyBandTable);
        };

        let mut bounded = Vec::with_capacity(rest.len());
        let mut previous: Option<u64> = None;
        for band in rest {
            let Some(max) = band.max else {
                return Err(QuestionnaireError::OpenBandNotLast {
                    label: band.label.clone(),
                });
            };
            if let Some(prev) = previous {
                if max <= prev {
                    return Err(QuestionnaireError::BandsNotAscending {
                        previous: prev,
                        next: max,
                    });
                }
            }
            previous = Some(max);
            bounded.push(BoundedBand {
                max,
                label: band.label.clone(),
            });
        }

        if let Some(max) = last.max {
            return Err(QuestionnaireError::MissingOpenBand { last_max: max });
        }

        Ok(Self {
            bounded,
            open: last.label.clone(),
        })
    }

    /// Label of the band containing `score`.
    pub fn classify(&self, score: u64) -> &str {
        self.bounded
            .iter()
            .find(|b| score <= b.max)
            .map_or(self.open.as_str(), |b| b.label.as_str())
    }

    /// Zero-based position of the band containing `score`.
    pub fn band_index(&self, score: u64) -> usize {
        self.bounded
            .iter()
            .position(|b| score <= b.max)
            .unwrap_or(self.bounded.len())
    }

    /// Number of bands, the open band included.
    pub fn len(&self) -> usize {
        self.bounded.len() + 1
    }

    /// A validated table is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All labels in ascending score order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bounded
            .iter()
            .map(|b| b.label.as_str())
            .chain(std::iter::once(self.open.as_str()))
    }

    /// The bands with their resolved lower bounds.
    pub fn ranges(&self) -> Vec<BandRange<'_>> {
        let mut ranges = Vec::with_capacity(self.len());
        let mut min = 0;
        for band in &self.bounded {
            ranges.push(BandRange {
                min,
                max: Some(band.max),
                label: &band.label,
            });
            min = band.max.saturating_add(1);
        }
        ranges.push(BandRange {
            min,
            max: None,
            label: &self.open,
        });
        ranges
    }
}

impl TryFrom<Vec<Band>> for BandTable {
    type Error = QuestionnaireError;

    fn try_from(bands: Vec<Band>) -> Result<Self, Self::Error> {
        BandTable::new(bands)
    }
}

impl From<BandTable> for Vec<Band> {
    fn from(table: BandTable) -> Self {
        table
            .bounded
            .into_iter()
            .map(|b| Band::up_to(b.max, b.label))
            .chain(std::iter::once(Band::open(table.open)))
            .collect()
    }
}

/// The two band tables a score is classified against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScale {
    pub complexity: BandTable,
    pub estimated_time: BandTable,
}

/// An ordered, immutable set of questions and the scale used to label totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestionnaire")]
pub struct Questionnaire {
    id: String,
    name: String,
    questions: Vec<Question>,
    scale: ScoringScale,
}

/// Unvalidated wire shape of a [`Questionnaire`].
#[derive(Deserialize)]
struct RawQuestionnaire {
    id: String,
    name: String,
    questions: Vec<Question>,
    scale: ScoringScale,
}

impl TryFrom<RawQuestionnaire> for Questionnaire {
    type Error = QuestionnaireError;

    fn try_from(raw: RawQuestionnaire) -> Result<Self, Self::Error> {
        Questionnaire::new(raw.id, raw.name, raw.questions, raw.scale)
    }
}

impl Questionnaire {
    /// Build and validate a questionnaire.
    ///
    /// Fails when there are no questions, when a question has no options,
    /// or when two options of one question share a label.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        questions: Vec<Question>,
        scale: ScoringScale,
    ) -> Result<Self, QuestionnaireError> {
        if questions.is_empty() {
            return Err(QuestionnaireError::NoQuestions);
        }

        for question in &questions {
            if question.options.is_empty() {
                return Err(QuestionnaireError::NoOptions {
                    question_id: question.id.clone(),
                });
            }
            let mut seen = HashSet::new();
            for option in &question.options {
                if !seen.insert(option.label.as_str()) {
                    return Err(QuestionnaireError::DuplicateOption {
                        question_id: question.id.clone(),
                        label: option.label.clone(),
                    });
                }
            }
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            questions,
            scale,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn scale(&self) -> &ScoringScale {
        &self.scale
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Highest total reachable by picking the top option of every question.
    pub fn max_score(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.max_score())).sum()
    }
}
