//! Precedence resolution for report settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. `EPICGRID_JIRA_URL` environment variable (Jira URL only, applied by clap)
//! 3. report.kdl (explicit `--config` path, or `~/.config/epicgrid/report.kdl`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use crate::config::{OutputFormat, ReportConfig, WbsArea};
use crate::models::parse_cycle_label;
use crate::{Error, Result};

/// Environment variable overriding the Jira base URL.
pub const JIRA_URL_ENV: &str = "EPICGRID_JIRA_URL";

pub const DEFAULT_JIRA_URL: &str = "https://jira.lsstcorp.org";
pub const DEFAULT_MAX_RESULTS: u32 = 10000;
pub const DEFAULT_WBS_FIELD: &str = "customfield_10500";
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10202";
pub const DEFAULT_TITLE: &str = "LDM-240 for 02C.06";
pub const DEFAULT_EPIC_QUERY: &str =
    r#"project = DM AND issuetype = Epic AND Team = "Data Access and Database""#;
pub const DEFAULT_MILESTONE_QUERY: &str =
    r#"project = "DM Long-range  Planning" AND wbs ~ "02C.06*" AND type = milestone"#;
pub const DEFAULT_FISCAL_YEARS: &[&str] = &["FY15", "FY16", "FY17", "FY18", "FY19", "FY20"];
pub const DEFAULT_WBS: &[(&str, &str)] = &[
    ("02C.06.01.01", "Catalogs, Alerts and Metadata"),
    ("02C.06.01.02", "Image and File Archive"),
    ("02C.06.02.01", "Data Access Client Framework"),
    ("02C.06.02.02", "Web Services"),
    ("02C.06.02.03", "Query Services"),
    ("02C.06.02.04", "Image and File Services"),
    ("02C.06.02.05", "Catalog Services"),
];

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag (or its environment fallback)
    CliFlag,
    /// Value from a config file
    ConfigFile(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile(path) => write!(f, "config:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub jira_url: Option<String>,
    pub show_blockers: Option<bool>,
    pub show_done: Option<bool>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jira_url(mut self, url: impl Into<String>) -> Self {
        self.jira_url = Some(url.into());
        self
    }

    pub fn with_show_blockers(mut self, show: bool) -> Self {
        self.show_blockers = Some(show);
        self
    }

    pub fn with_show_done(mut self, show: bool) -> Self {
        self.show_done = Some(show);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Fully resolved settings for one report run.
///
/// This is the explicit configuration handed to the fetcher, the
/// classifier and the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    pub jira_url: Resolved<String>,
    pub max_results: u32,
    pub wbs_field: String,
    pub story_points_field: String,
    pub epic_query: String,
    /// `None` when the milestone row is disabled
    pub milestone_query: Option<String>,
    pub title: String,
    pub fiscal_years: Vec<String>,
    pub cycles: Vec<String>,
    pub wbs: Vec<WbsArea>,
    pub show_blockers: Resolved<bool>,
    pub show_done: Resolved<bool>,
    pub output_format: Resolved<OutputFormat>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        let fiscal_years: Vec<String> = DEFAULT_FISCAL_YEARS.iter().map(|s| s.to_string()).collect();
        let cycles = cycles_for_years(&fiscal_years);
        Self {
            jira_url: Resolved::new(DEFAULT_JIRA_URL.to_string(), ValueSource::Default),
            max_results: DEFAULT_MAX_RESULTS,
            wbs_field: DEFAULT_WBS_FIELD.to_string(),
            story_points_field: DEFAULT_STORY_POINTS_FIELD.to_string(),
            epic_query: DEFAULT_EPIC_QUERY.to_string(),
            milestone_query: Some(DEFAULT_MILESTONE_QUERY.to_string()),
            title: DEFAULT_TITLE.to_string(),
            fiscal_years,
            cycles,
            wbs: DEFAULT_WBS
                .iter()
                .map(|(code, name)| WbsArea::new(*code, *name))
                .collect(),
            show_blockers: Resolved::new(true, ValueSource::Default),
            show_done: Resolved::new(true, ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Html, ValueSource::Default),
        }
    }
}

impl ReportSettings {
    pub fn show_blockers(&self) -> bool {
        self.show_blockers.value
    }

    pub fn show_done(&self) -> bool {
        self.show_done.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    /// Check cross-field constraints.
    ///
    /// Every cycle must belong to a configured fiscal year, otherwise an
    /// epic prefixed with it would have no column to land in.
    pub fn validate(&self) -> Result<()> {
        for cycle in &self.cycles {
            let Some((_, fiscal_year)) = parse_cycle_label(cycle) else {
                return Err(Error::Config(format!("invalid cycle '{}'", cycle)));
            };
            if !self.fiscal_years.contains(&fiscal_year) {
                return Err(Error::Config(format!(
                    "cycle '{}' belongs to {} which is not in fiscal-years",
                    cycle, fiscal_year
                )));
            }
        }
        if self.wbs.is_empty() {
            return Err(Error::Config("at least one wbs area is required".to_string()));
        }
        Ok(())
    }
}

/// Default cycle labels for a set of fiscal years: `S<yy>` and `W<yy>` per year.
pub fn cycles_for_years(fiscal_years: &[String]) -> Vec<String> {
    fiscal_years
        .iter()
        .filter_map(|fy| fy.strip_prefix("FY"))
        .flat_map(|yy| [format!("S{}", yy), format!("W{}", yy)])
        .collect()
}

/// Default config file location (`<config_dir>/epicgrid/report.kdl`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("epicgrid").join("report.kdl"))
}

/// Load the config file, if any.
///
/// An explicit path must exist. The default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<(PathBuf, ReportConfig)>> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            Ok(Some((path.to_path_buf(), ReportConfig::load(path)?)))
        }
        None => match default_config_path() {
            Some(path) if path.exists() => {
                let config = ReportConfig::load(&path)?;
                Ok(Some((path, config)))
            }
            _ => Ok(None),
        },
    }
}

/// Resolve settings with full precedence chain.
///
/// `file` is the loaded config file and its path, if one was found.
pub fn resolve_settings(
    file: Option<(&Path, &ReportConfig)>,
    overrides: &ConfigOverrides,
) -> Result<ReportSettings> {
    let mut result = ReportSettings::default();

    if let Some((path, config)) = file {
        let source = || ValueSource::ConfigFile(path.to_path_buf());

        if let Some(ref url) = config.jira_url {
            result.jira_url = Resolved::new(url.clone(), source());
        }
        if let Some(n) = config.max_results {
            result.max_results = n;
        }
        if let Some(ref field) = config.wbs_field {
            result.wbs_field = field.clone();
        }
        if let Some(ref field) = config.story_points_field {
            result.story_points_field = field.clone();
        }
        if let Some(ref query) = config.epic_query {
            result.epic_query = query.clone();
        }
        if let Some(ref query) = config.milestone_query {
            result.milestone_query = if query.trim().is_empty() {
                None
            } else {
                Some(query.clone())
            };
        }
        if let Some(ref title) = config.title {
            result.title = title.clone();
        }
        if let Some(ref years) = config.fiscal_years {
            result.fiscal_years = years.clone();
            result.cycles = cycles_for_years(years);
        }
        // Explicit cycles win over the ones derived from fiscal-years
        if let Some(ref cycles) = config.cycles {
            result.cycles = cycles.clone();
        }
        if let Some(ref areas) = config.wbs {
            result.wbs = areas.clone();
        }
        if let Some(show) = config.show_blockers {
            result.show_blockers = Resolved::new(show, source());
        }
        if let Some(show) = config.show_done {
            result.show_done = Resolved::new(show, source());
        }
        if let Some(format) = config.output_format {
            result.output_format = Resolved::new(format, source());
        }
    }

    if let Some(ref url) = overrides.jira_url {
        result.jira_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    }
    if let Some(show) = overrides.show_blockers {
        result.show_blockers = Resolved::new(show, ValueSource::CliFlag);
    }
    if let Some(show) = overrides.show_done {
        result.show_done = Resolved::new(show, ValueSource::CliFlag);
    }
    if let Some(format) = overrides.output_format {
        result.output_format = Resolved::new(format, ValueSource::CliFlag);
    }

    result.validate()?;
    Ok(result)
}
