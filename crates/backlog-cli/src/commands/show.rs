//! The `backlog show` command.

use std::path::Path;

use anyhow::Result;

use backlog_core::record::RequestId;

use super::{open_service, Format};

pub async fn execute(
    config_path: Option<&Path>,
    client: &str,
    id: RequestId,
    format: String,
) -> Result<()> {
    let format = Format::parse(&format)?;
    let service = open_service(config_path)?;
    let request = service.get(client, id).await?;

    if format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    println!("Request #{}: {}", request.id, request.title);
    println!("Score: {}", request.score);
    println!("Complexity: {}", request.complexity);
    println!("Estimated time: {}", request.estimated_time);
    println!(
        "Created: {}",
        request.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Answers:");
    for (i, question) in service.questionnaire().questions().iter().enumerate() {
        let answer = match request.answers.get(i).map(String::as_str) {
            None | Some("") => "(unanswered)",
            Some(label) if question.option(label).is_none() => {
                println!("  {}: {label} (no longer an option)", question.id);
                continue;
            }
            Some(label) => label,
        };
        println!("  {}: {answer}", question.id);
    }

    Ok(())
}
