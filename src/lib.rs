//! Epicgrid - builds a WBS-by-fiscal-year planning grid from Jira epics.
//!
//! This library provides the core functionality for the `epicgrid` CLI tool:
//! fetching epics and planning milestones from a Jira search endpoint,
//! classifying each epic into a (WBS, fiscal year) cell or the orphan list,
//! summing story points per fiscal year, and rendering the result as HTML.

pub mod cli;
pub mod commands;
pub mod config;
pub mod jira;
pub mod models;
pub mod report;

/// Library-level error type for Epicgrid operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Jira(#[from] jira::JiraError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for Epicgrid operations.
pub type Result<T> = std::result::Result<T, Error>;
