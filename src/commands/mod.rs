//! Report generation for the Epicgrid CLI.
//!
//! `generate` performs the whole run: search Jira for epics (and, if
//! configured, planning milestones), build the [`Report`], and hand back a
//! [`GeneratedReport`] that can be emitted in any [`OutputFormat`].

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::Result;
use crate::config::{OutputFormat, ReportSettings};
use crate::jira::JiraClient;
use crate::report::{Report, render_html};

/// Command results that can be emitted in each output format.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Render as an HTML document.
    fn to_html(&self) -> String;

    /// Format as `PLANNING;...` lines.
    fn to_planning(&self) -> String;

    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Html => self.to_html(),
            OutputFormat::Json => self.to_json(),
            OutputFormat::Planning => self.to_planning(),
        }
    }
}

/// A report together with the time it was generated.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: Report,
    pub generated_at: DateTime<Utc>,
}

impl Output for GeneratedReport {
    fn to_json(&self) -> String {
        pretty_json(&self.report)
    }

    fn to_html(&self) -> String {
        render_html(&self.report, self.generated_at)
    }

    fn to_planning(&self) -> String {
        self.report
            .planning
            .iter()
            .map(|line| format!("{}\n", line))
            .collect()
    }
}

/// Pretty-print `value`, logging and returning an empty string on failure.
fn pretty_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to serialize report");
            debug_assert!(false, "report serialization failed: {}", e);
            String::new()
        }
    }
}

/// Fetch epics and milestones and assemble the report.
pub fn generate(settings: &ReportSettings, client: &JiraClient) -> Result<GeneratedReport> {
    info!(jira = client.base_url(), "fetching epics");
    let epics = client.search(&settings.epic_query, settings.max_results)?;

    let milestones = match settings.milestone_query {
        Some(ref query) => {
            info!("fetching planning milestones");
            Some(client.search(query, settings.max_results)?.issues)
        }
        None => None,
    };

    let report = Report::build(&epics.issues, milestones.as_deref(), settings);
    info!(
        epics = epics.issues.len(),
        placed = report.placed_count(),
        orphans = report.orphans.len(),
        story_points = report.totals.grand_total(),
        "report built"
    );

    Ok(GeneratedReport {
        report,
        generated_at: Utc::now(),
    })
}

/// Write output to `path`, or to stdout when no path is given.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
