//! CLI argument definitions for Epicgrid.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigOverrides, JIRA_URL_ENV, OutputFormat};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("EPICGRID_GIT_COMMIT"),
    " ",
    env!("EPICGRID_BUILD_TIMESTAMP"),
    ")"
);

/// Epicgrid - WBS × fiscal-year planning grid from Jira epics.
///
/// Fetches epics and planning milestones from Jira, places each epic in the
/// cell named by its WBS code and summary prefix ("FY17...", "W17..."), and
/// writes an HTML report with orphans, blockers and story-point totals.
#[derive(Parser, Debug)]
#[command(name = "epicgrid")]
#[command(author, version = VERSION, about = "Build a WBS × fiscal-year HTML planning grid from Jira epics", long_about = None)]
pub struct Cli {
    /// Annotate epics with the epics blocking them (0 or 1)
    #[arg(short = 'b', long = "showBlockers", value_name = "0|1", value_parser = parse_toggle)]
    pub show_blockers: Option<bool>,

    /// Include epics whose status is Done (0 or 1)
    #[arg(short = 'd', long = "showDone", value_name = "0|1", value_parser = parse_toggle)]
    pub show_done: Option<bool>,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long = "outFileName", value_name = "PATH")]
    pub out_file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to report.kdl (default: ~/.config/epicgrid/report.kdl)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Jira base URL
    #[arg(long = "jira-url", env = JIRA_URL_ENV, value_name = "URL")]
    pub jira_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Settings given on the command line, for precedence resolution.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            jira_url: self.jira_url.clone(),
            show_blockers: self.show_blockers,
            show_done: self.show_done,
            output_format: self.format,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Parse a 0/1 toggle. `true`/`false` are accepted as well.
fn parse_toggle(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(format!("expected 0 or 1, got '{}'", s)),
    }
}
