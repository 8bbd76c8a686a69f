//! The `backlog questions` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use backlog_core::model::BandTable;

use super::load_questionnaire;

pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let questionnaire = load_questionnaire(config_path)?;

    println!(
        "Questionnaire: {} ({} questions, max score {})",
        questionnaire.name(),
        questionnaire.len(),
        questionnaire.max_score()
    );

    for (i, question) in questionnaire.questions().iter().enumerate() {
        println!("\n{}. {} [{}]", i + 1, question.text, question.id);
        for option in &question.options {
            println!("   - {} ({} points)", option.label, option.score);
        }
    }

    let scale = questionnaire.scale();
    println!("\n{}", band_table("Complexity", &scale.complexity));
    println!("{}", band_table("Estimated Time", &scale.estimated_time));

    Ok(())
}

fn band_table(heading: &str, bands: &BandTable) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Score", heading]);
    for range in bands.ranges() {
        table.add_row(vec![Cell::new(range.describe()), Cell::new(range.label)]);
    }
    table
}
