//! Epicgrid CLI - WBS × fiscal-year planning grid from Jira epics.

use std::process;

use clap::Parser;
use epicgrid::cli::Cli;
use epicgrid::commands::{self, Output};
use epicgrid::config::{self, ReportSettings};
use epicgrid::jira::JiraClient;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr; stdout carries the report.
///
/// `RUST_LOG` takes precedence over the `-v` level.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), epicgrid::Error> {
    let file = config::load_config(cli.config.as_deref())?;
    let settings = config::resolve_settings(
        file.as_ref().map(|(path, loaded)| (path.as_path(), loaded)),
        &cli.overrides(),
    )?;
    log_settings(&settings);

    let client = JiraClient::new(settings.jira_url.value.clone());
    let generated = commands::generate(&settings, &client)?;
    let content = generated.render(settings.output_format());

    commands::write_output(&content, cli.out_file.as_deref())
}

fn log_settings(settings: &ReportSettings) {
    debug!(
        jira_url = %settings.jira_url.value,
        source = %settings.jira_url.source,
        "resolved jira url"
    );
    debug!(
        show_blockers = settings.show_blockers(),
        source = %settings.show_blockers.source,
        "resolved show-blockers"
    );
    debug!(
        show_done = settings.show_done(),
        source = %settings.show_done.source,
        "resolved show-done"
    );
    debug!(
        format = %settings.output_format(),
        source = %settings.output_format.source,
        "resolved output format"
    );
}
