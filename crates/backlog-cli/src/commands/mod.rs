pub mod add;
pub mod edit;
pub mod init;
pub mod list;
pub mod questions;
pub mod remove;
pub mod report;
pub mod score;
pub mod show;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use backlog_core::model::Questionnaire;
use backlog_core::record::StoredRequest;
use backlog_core::service::RequestService;
use backlog_store::config::{create_rate_limits, create_store, load_config_from};

/// Load the configured questionnaire (the built-in one by default).
pub(crate) fn load_questionnaire(config_path: Option<&Path>) -> Result<Questionnaire> {
    let config = load_config_from(config_path)?;
    backlog_store::load_questionnaire(&config)
}

/// Wire the request service from configuration.
pub(crate) fn open_service(config_path: Option<&Path>) -> Result<RequestService> {
    let config = load_config_from(config_path)?;
    let questionnaire = backlog_store::load_questionnaire(&config)?;
    let store = create_store(&config.store);
    tracing::debug!(store = store.name(), questionnaire = questionnaire.id(), "service ready");

    Ok(RequestService::new(store, Arc::new(questionnaire))
        .with_rate_limits(create_rate_limits(&config.rate_limit)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    Text,
    Json,
}

impl Format {
    pub(crate) fn parse(format: &str) -> Result<Self> {
        match format {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => anyhow::bail!("unknown format: {other} (expected text or json)"),
        }
    }
}

pub(crate) fn requests_table(requests: &[StoredRequest]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Score",
        "Complexity",
        "Estimated Time",
        "Created",
    ]);
    for r in requests {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.title),
            Cell::new(r.score),
            Cell::new(&r.complexity),
            Cell::new(&r.estimated_time),
            Cell::new(r.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

/// One-line summary printed after a write.
pub(crate) fn summary_line(verb: &str, request: &StoredRequest) -> String {
    format!(
        "{verb} request #{}: {} (score {}, {}, {})",
        request.id, request.title, request.score, request.complexity, request.estimated_time
    )
}
