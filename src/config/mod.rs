//! Configuration for Epicgrid.
//!
//! Settings come from one optional KDL file, `report.kdl`, located at
//! `~/.config/epicgrid/report.kdl` unless `--config` names another path.
//!
//! It contains:
//! - `jira-url`, `max-results` - where and how much to search
//! - `wbs-field`, `story-points-field` - instance-specific custom field ids
//! - `epic-query`, `milestone-query` - the two JQL filters
//! - `fiscal-years`, `cycles`, `wbs` - the grid axes
//! - `show-blockers`, `show-done`, `output-format` - report toggles
//!
//! ## Precedence
//!
//! CLI flag > environment > config file > built-in defaults
//!
//! Use the [`resolver`] module to produce a [`ReportSettings`].

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, JIRA_URL_ENV, ReportSettings, Resolved, ValueSource, default_config_path,
    load_config, resolve_settings,
};
pub use schema::{OutputFormat, ReportConfig, WbsArea};
