//! The built-in estimation questionnaire and its default scoring scale.
//!
//! Every adapter scores against this one definition unless configuration
//! names a questionnaire file (see [`crate::parser`]).

use crate::model::{Band, BandTable, Question, QuestionOption, Questionnaire, ScoringScale};

pub const BUILTIN_ID: &str = "backlog-estimation";
pub const BUILTIN_NAME: &str = "Backlog estimation";

/// Default complexity bands (inclusive upper bounds).
pub fn complexity_bands() -> Vec<Band> {
    vec![
        Band::up_to(100, "Low Complexity"),
        Band::up_to(250, "Medium Complexity"),
        Band::up_to(400, "High Complexity"),
        Band::open("Very High Complexity"),
    ]
}

/// Default time-estimate bands (inclusive upper bounds).
pub fn time_bands() -> Vec<Band> {
    vec![
        Band::up_to(50, "Less than 1 week"),
        Band::up_to(150, "1-3 weeks"),
        Band::up_to(300, "1-2 months"),
        Band::up_to(500, "3-6 months"),
        Band::open("More than 6 months"),
    ]
}

/// The default scale used by the built-in questionnaire and by questionnaire
/// files that do not declare their own bands.
pub fn standard_scale() -> ScoringScale {
    ScoringScale {
        complexity: BandTable::new(complexity_bands())
            .expect("default complexity bands are valid"),
        estimated_time: BandTable::new(time_bands()).expect("default time bands are valid"),
    }
}

fn q(id: &str, text: &str, options: &[(&str, u32)]) -> Question {
    Question::new(
        id,
        text,
        options
            .iter()
            .map(|(label, score)| QuestionOption::new(*label, *score))
            .collect(),
    )
}

/// The ten built-in questions, in answer order.
pub fn builtin_questions() -> Vec<Question> {
    vec![
        q(
            "external_integration",
            "Do we have to integrate or adapt the solution of an external partner?",
            &[
                ("No", 0),
                ("Yes, standard API, already used by lot of other clients", 100),
                ("Yes, but partner creates specifications for us", 250),
                ("No, but we have to enhance their system drastically", 75),
            ],
        ),
        q(
            "app_touch",
            "Do we have to touch all parts of the app?",
            &[
                ("Yes", 100),
                ("No, but 2 YS squads impacted", 75),
                ("No only 1 squad", 30),
            ],
        ),
        q(
            "new_business",
            "Is this new business for the company?",
            &[
                ("No", 0),
                ("Yes, but already exists at Company 2", 50),
                ("Yes for 1 & 2, but not complex", 100),
                ("Yes for 1 & 2, and complex", 150),
            ],
        ),
        q(
            "future_scope",
            "Is the future scope clear?",
            &[
                ("Yes, clear and probability of change is very low", 50),
                ("Yes, but high probability of change is high", 75),
                ("No", 100),
            ],
        ),
        q(
            "swe_dependencies",
            "Do we have very high dependencies on other engineering teams?",
            &[
                ("No", 0),
                ("Yes, high impact on multiple teams", 300),
                (
                    "Yes, high impact on one team or medium impact on multiple teams",
                    150,
                ),
                ("Yes, but small impacts", 50),
            ],
        ),
        q(
            "fraud_compliance",
            "Do we have impacts on fraud or compliance workflows?",
            &[("No", 0), ("Yes", 20)],
        ),
        q(
            "it_dependencies",
            "Do we have IT dependencies on new hardware to order?",
            &[("No", 0), ("Yes", 50)],
        ),
        q(
            "security_analysis",
            "Do we need a complex IT security or legal analysis?",
            &[
                ("No", 0),
                ("Yes, with potential big impacts on solution", 150),
                ("Yes, but no impact on solution", 20),
            ],
        ),
        q(
            "new_technology",
            "Do we have to use a new technology?",
            &[("No", 0), ("Yes", 100)],
        ),
        q(
            "new_architecture",
            "Do we have to put in place a new architecture?",
            &[
                ("No, only upgrade on current one", 0),
                ("Yes, but a new small piece", 20),
                ("Yes, and big impact on current one", 100),
            ],
        ),
    ]
}

impl Questionnaire {
    /// The shared built-in questionnaire with the default scale.
    pub fn builtin() -> Self {
        Questionnaire::new(BUILTIN_ID, BUILTIN_NAME, builtin_questions(), standard_scale())
            .expect("built-in questionnaire is valid")
    }
}
