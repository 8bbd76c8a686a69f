//! The `backlog score` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use backlog_core::scoring::{evaluate, score_breakdown, AnswerOutcome};

use super::load_questionnaire;

pub fn execute(
    config_path: Option<&Path>,
    answers: Vec<String>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let questionnaire = load_questionnaire(config_path)?;
    let result = evaluate(&questionnaire, &answers);
    let breakdown = explain.then(|| score_breakdown(&questionnaire, &answers));

    if json {
        let mut value = serde_json::to_value(&result)?;
        if let Some(breakdown) = &breakdown {
            value["breakdown"] = serde_json::to_value(breakdown)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if let Some(breakdown) = &breakdown {
        let mut table = Table::new();
        table.set_header(vec!["Question", "Answer", "Points", "Status"]);
        for entry in breakdown {
            let status = match entry.outcome {
                AnswerOutcome::Matched => "ok",
                AnswerOutcome::Unanswered => "unanswered",
                AnswerOutcome::Unmatched => "no such option",
            };
            table.add_row(vec![
                Cell::new(&entry.question_id),
                Cell::new(entry.selected.as_deref().unwrap_or("-")),
                Cell::new(entry.points),
                Cell::new(status),
            ]);
        }
        println!("{table}");
    }

    println!("Score: {}", result.score);
    println!("Complexity: {}", result.complexity);
    println!("Estimated time: {}", result.estimated_time);

    Ok(())
}
