//! KDL schema for report.kdl.
//!
//! This module provides:
//! - `ReportConfig`, the Rust struct mirroring the file
//! - Parsing from a KDL document or file
//! - Per-value validation
//!
//! Every value is optional; anything left unset falls through to the
//! built-in defaults during resolution.

use std::path::Path;

use kdl::{KdlDocument, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

use crate::models::{is_fiscal_year_label, parse_cycle_label};
use crate::{Error, Result};

/// Output format of the generated report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// HTML document (default)
    #[default]
    Html,
    /// The assembled report as JSON
    Json,
    /// `PLANNING;<fy>;<key>;<points>;<summary>` lines for spreadsheet import
    Planning,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "planning" => Some(OutputFormat::Planning),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Planning => "planning",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A work-breakdown-structure area: one row of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WbsArea {
    /// WBS code as stored on epics (e.g., "02C.06.02.03")
    pub code: String,
    /// Human-readable area name
    pub name: String,
}

impl WbsArea {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Report settings stored in report.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// jira-url "https://jira.lsstcorp.org"
/// max-results 10000
/// wbs-field "customfield_10500"
/// story-points-field "customfield_10202"
/// epic-query "project = DM AND issuetype = Epic"
/// milestone-query ""          // empty disables the milestone row
/// title "LDM-240 for 02C.06"
/// fiscal-years "FY15" "FY16" "FY17"
/// cycles "S15" "W15" "S16" "W16"
/// wbs "02C.06.01.01" "Catalogs, Alerts and Metadata"
/// wbs "02C.06.01.02" "Image and File Archive"
/// show-blockers #true
/// show-done #false
/// output-format "html"        // or "json", "planning"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Base URL of the Jira instance
    pub jira_url: Option<String>,

    /// `maxResults` passed to each search
    pub max_results: Option<u32>,

    /// Custom field holding the WBS code
    pub wbs_field: Option<String>,

    /// Custom field holding story points
    pub story_points_field: Option<String>,

    /// JQL selecting the epics to classify
    pub epic_query: Option<String>,

    /// JQL selecting planning milestones
    pub milestone_query: Option<String>,

    /// Document title
    pub title: Option<String>,

    /// Grid columns, in order
    pub fiscal_years: Option<Vec<String>>,

    /// Cycle labels recognised as summary prefixes
    pub cycles: Option<Vec<String>>,

    /// Grid rows, in file order
    pub wbs: Option<Vec<WbsArea>>,

    pub show_blockers: Option<bool>,

    pub show_done: Option<bool>,

    pub output_format: Option<OutputFormat>,
}

impl ReportConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the individual values.
    ///
    /// Returns an error message describing the first invalid value.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_results == Some(0) {
            return Err("max-results must be greater than 0".to_string());
        }

        if let Some(ref years) = self.fiscal_years {
            if years.is_empty() {
                return Err("fiscal-years must list at least one year".to_string());
            }
            if let Some(bad) = years.iter().find(|y| !is_fiscal_year_label(y)) {
                return Err(format!("invalid fiscal year '{}', expected FY<yy>", bad));
            }
        }

        if let Some(ref cycles) = self.cycles {
            if let Some(bad) = cycles.iter().find(|c| parse_cycle_label(c).is_none()) {
                return Err(format!(
                    "invalid cycle '{}', expected W<yy> or S<yy>",
                    bad
                ));
            }
        }

        if let Some(ref areas) = self.wbs {
            for (i, area) in areas.iter().enumerate() {
                if area.code.trim().is_empty() {
                    return Err("wbs code must not be empty".to_string());
                }
                if areas[..i].iter().any(|a| a.code == area.code) {
                    return Err(format!("duplicate wbs code '{}'", area.code));
                }
            }
        }

        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. Malformed known nodes are errors.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self> {
        let mut config = Self::new();

        for node in doc.nodes() {
            match node.name().value() {
                "jira-url" => config.jira_url = get_string_arg(node)?,
                "max-results" => {
                    if let Some(n) = get_integer_arg(node)? {
                        let n = u32::try_from(n).map_err(|_| {
                            Error::Config(format!("max-results out of range: {}", n))
                        })?;
                        config.max_results = Some(n);
                    }
                }
                "wbs-field" => config.wbs_field = get_string_arg(node)?,
                "story-points-field" => config.story_points_field = get_string_arg(node)?,
                "epic-query" => config.epic_query = get_string_arg(node)?,
                "milestone-query" => config.milestone_query = get_string_arg(node)?,
                "title" => config.title = get_string_arg(node)?,
                "fiscal-years" => config.fiscal_years = Some(get_string_args(node)?),
                "cycles" => config.cycles = Some(get_string_args(node)?),
                "wbs" => {
                    let area = parse_wbs_node(node)?;
                    config.wbs.get_or_insert_with(Vec::new).push(area);
                }
                "show-blockers" => config.show_blockers = get_bool_arg(node)?,
                "show-done" => config.show_done = get_bool_arg(node)?,
                "output-format" => {
                    if let Some(s) = get_string_arg(node)? {
                        let format = OutputFormat::parse(&s).ok_or_else(|| {
                            Error::Config(format!("unknown output-format '{}'", s))
                        })?;
                        config.output_format = Some(format);
                    }
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Load and validate config from a KDL file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let doc: KdlDocument = content.parse().map_err(|e| {
            Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e))
        })?;

        let config = Self::from_kdl(&doc)?;
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Parse `wbs "<code>" "<name>"`.
fn parse_wbs_node(node: &KdlNode) -> Result<WbsArea> {
    let mut args = get_string_args(node)?.into_iter();
    let code = args
        .next()
        .ok_or_else(|| Error::Config("wbs node must have a code argument".to_string()))?;
    let name = args.next().unwrap_or_default();
    Ok(WbsArea { code, name })
}

fn type_error(node: &KdlNode, expected: &str, got: &KdlValue) -> Error {
    Error::Config(format!(
        "{} expects {}, got {}",
        node.name().value(),
        expected,
        got
    ))
}

/// Get a string argument from a node's first entry.
///
/// A node without arguments yields `None`; any other type is an error.
fn get_string_arg(node: &KdlNode) -> Result<Option<String>> {
    match node.entries().first().map(|e| e.value()) {
        None => Ok(None),
        Some(KdlValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(type_error(node, "a string", other)),
    }
}

/// Get all positional string arguments of a node.
fn get_string_args(node: &KdlNode) -> Result<Vec<String>> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .map(|e| match e.value() {
            KdlValue::String(s) => Ok(s.clone()),
            other => Err(type_error(node, "strings", other)),
        })
        .collect()
}

/// Get a boolean argument from a node's first entry.
fn get_bool_arg(node: &KdlNode) -> Result<Option<bool>> {
    match node.entries().first().map(|e| e.value()) {
        None => Ok(None),
        Some(KdlValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(node, "#true/#false", other)),
    }
}

/// Get an integer argument from a node's first entry.
fn get_integer_arg(node: &KdlNode) -> Result<Option<i128>> {
    match node.entries().first().map(|e| e.value()) {
        None => Ok(None),
        Some(KdlValue::Integer(n)) => Ok(Some(*n)),
        Some(other) => Err(type_error(node, "an integer", other)),
    }
}
