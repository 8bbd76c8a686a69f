//! The `backlog edit` command.

use std::path::Path;

use anyhow::Result;

use backlog_core::record::{RequestId, RequestUpdate};

use super::{open_service, summary_line};

pub async fn execute(
    config_path: Option<&Path>,
    client: &str,
    id: RequestId,
    title: Option<String>,
    answers: Vec<String>,
    clear_answers: bool,
) -> Result<()> {
    let answers = if clear_answers {
        Some(Vec::new())
    } else {
        (!answers.is_empty()).then_some(answers)
    };
    let update = RequestUpdate { title, answers };
    if update.is_empty() {
        anyhow::bail!("nothing to change: pass --title, --answer or --clear-answers");
    }

    let service = open_service(config_path)?;
    let updated = service.update(client, id, update).await?;
    println!("{}", summary_line("Updated", &updated));
    Ok(())
}
