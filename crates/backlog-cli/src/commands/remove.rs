//! The `backlog remove` command.

use std::path::Path;

use anyhow::Result;

use backlog_core::record::RequestId;

use super::open_service;

pub async fn execute(config_path: Option<&Path>, client: &str, id: RequestId) -> Result<()> {
    let service = open_service(config_path)?;
    if service.delete(client, id).await? {
        println!("Removed request #{id}");
    } else {
        println!("Request #{id} does not exist, nothing removed.");
    }
    Ok(())
}
