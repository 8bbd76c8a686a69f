//! The `backlog report` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use backlog_core::record::ListQuery;
use backlog_report::html::write_html_report;
use backlog_report::BacklogReport;

use super::open_service;

pub async fn execute(config_path: Option<&Path>, client: &str, output: PathBuf) -> Result<()> {
    let service = open_service(config_path)?;
    let requests = service.list(client, &ListQuery::default()).await?;
    let report = BacklogReport::new(service.questionnaire(), requests);

    write_html_report(&report, &output)?;
    tracing::info!(path = %output.display(), requests = report.requests.len(), "report written");
    println!(
        "Report written to {} ({} requests)",
        output.display(),
        report.requests.len()
    );
    Ok(())
}
