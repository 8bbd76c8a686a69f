//! The `backlog add` command.

use std::path::Path;

use anyhow::Result;

use backlog_core::record::NewRequest;

use super::{open_service, summary_line};

pub async fn execute(
    config_path: Option<&Path>,
    client: &str,
    title: String,
    answers: Vec<String>,
) -> Result<()> {
    let service = open_service(config_path)?;
    if answers.len() > service.questionnaire().len() {
        tracing::warn!(
            given = answers.len(),
            questions = service.questionnaire().len(),
            "extra answers are ignored"
        );
    }

    let created = service
        .create(client, NewRequest { title, answers })
        .await?;
    println!("{}", summary_line("Created", &created));
    Ok(())
}
