//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use backlog_core::model::BandTable;

use crate::BacklogReport;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a backlog report.
pub fn generate_html(report: &BacklogReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Backlog report: {}</title>\n",
        html_escape(&report.questionnaire_name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Backlog report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Questionnaire: <strong>{}</strong> | {} requests | {}</p>\n",
        html_escape(&report.questionnaire_name),
        report.requests.len(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Complexity</th><th>Requests</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, (label, count)) in report.complexity_counts().into_iter().enumerate() {
        html.push_str(&format!(
            "<tr class=\"band-{i}\"><td>{}</td><td>{count}</td></tr>\n",
            html_escape(label)
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Requests
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Requests</h2>\n");
    if report.requests.is_empty() {
        html.push_str("<p class=\"meta\">No requests yet.</p>\n");
    } else {
        html.push_str("<table class=\"results-table\" id=\"requests\">\n");
        html.push_str("<thead><tr><th onclick=\"sortTable(0)\">ID</th><th onclick=\"sortTable(1)\">Title</th><th onclick=\"sortTable(2)\">Score</th><th onclick=\"sortTable(3)\">Complexity</th><th onclick=\"sortTable(4)\">Estimated Time</th><th onclick=\"sortTable(5)\">Created</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for r in &report.requests {
            let band = report.scale.complexity.band_index(r.score);
            html.push_str(&format!(
                "<tr class=\"band-{band}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                r.id,
                html_escape(&r.title),
                r.score,
                html_escape(&r.complexity),
                html_escape(&r.estimated_time),
                r.created_at.format("%Y-%m-%d"),
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    // Scoring reference
    html.push_str("<section class=\"reference\">\n");
    html.push_str("<h2>Scoring reference</h2>\n");
    html.push_str(&band_table("Complexity", &report.scale.complexity));
    html.push_str(&band_table("Estimated Time", &report.scale.estimated_time));
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &BacklogReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    Ok(())
}

fn band_table(heading: &str, table: &BandTable) -> String {
    let mut out = format!(
        "<table class=\"reference\">\n<thead><tr><th>Score</th><th>{}</th></tr></thead>\n<tbody>\n",
        html_escape(heading)
    );
    for range in table.ranges() {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            range.describe(),
            html_escape(range.label)
        ));
    }
    out.push_str("</tbody></table>\n");
    out
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb;
  --band-0: #dcfce7; --band-1: #ecfccb; --band-2: #fef9c3; --band-3: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151;
    --band-0: #064e3b; --band-1: #365314; --band-2: #713f12; --band-3: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
table.reference { width: auto; display: inline-table; margin-right: 2rem; vertical-align: top; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.band-0 { background: var(--band-0); }
.band-1 { background: var(--band-1); }
.band-2 { background: var(--band-2); }
.band-3 { background: var(--band-3); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('requests');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const numeric = col === 0 || col === 2;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const cmp = numeric ? Number(va) - Number(vb) : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
