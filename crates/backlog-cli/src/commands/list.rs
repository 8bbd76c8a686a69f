//! The `backlog list` command.

use std::path::Path;

use anyhow::Result;

use backlog_core::record::{ListQuery, SortOrder};

use super::{open_service, requests_table, Format};

pub async fn execute(
    config_path: Option<&Path>,
    client: &str,
    complexity: Option<String>,
    sort: SortOrder,
    format: String,
) -> Result<()> {
    let format = Format::parse(&format)?;
    let service = open_service(config_path)?;
    let requests = service
        .list(client, &ListQuery { complexity, sort })
        .await?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&requests)?),
        Format::Text if requests.is_empty() => println!("No requests found."),
        Format::Text => {
            println!("{}", requests_table(&requests));
            println!("{} request(s)", requests.len());
        }
    }

    Ok(())
}
