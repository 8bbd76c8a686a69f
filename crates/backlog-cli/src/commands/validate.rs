//! The `backlog validate` command.

use std::path::PathBuf;

use anyhow::Result;

use backlog_core::parser::{parse_questionnaire, validate_questionnaire};

pub fn execute(path: PathBuf) -> Result<()> {
    let questionnaire = parse_questionnaire(&path)?;

    println!(
        "Questionnaire: {} ({} questions, max score {})",
        questionnaire.name(),
        questionnaire.len(),
        questionnaire.max_score()
    );

    let warnings = validate_questionnaire(&questionnaire);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Questionnaire valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
