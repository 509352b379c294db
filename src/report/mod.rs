//! Report assembly.
//!
//! A [`Report`] is the WBS × fiscal-year grid plus everything printed around
//! it: orphans, per-year story-point totals, planning milestones and the
//! planning lines used for spreadsheet export.
//!
//! - [`classify`] - per-issue placement rule
//! - [`aggregate`] - story points and FTE figures
//! - [`milestones`] - milestone grouping
//! - [`render`] - HTML output

pub mod aggregate;
pub mod classify;
pub mod milestones;
pub mod render;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ReportSettings, WbsArea};
use crate::models::{ClassifiedEntry, Cycle, Issue};

pub use aggregate::{FiscalYearTotal, StoryPointTotals};
pub use classify::{Classification, Classifier, DiscardReason, StatusIndex};
pub use milestones::MilestonePlan;
pub use render::render_html;

/// Entries of one (WBS, fiscal year) cell, in classification order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub fiscal_year: String,
    pub entries: Vec<ClassifiedEntry>,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by cycle: winter, then summer, then unspecified.
    ///
    /// Classification order is kept within each cycle.
    pub fn entries_by_cycle(&self) -> impl Iterator<Item = &ClassifiedEntry> {
        Cycle::RENDER_ORDER
            .into_iter()
            .flat_map(move |cycle| self.entries.iter().filter(move |e| e.cycle == cycle))
    }
}

/// One grid row: a WBS area and its cells, one per fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WbsRow {
    #[serde(flatten)]
    pub area: WbsArea,
    pub cells: Vec<Cell>,
}

/// One `PLANNING;...` export line for a placed epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningLine {
    pub fiscal_year: String,
    pub key: String,
    pub story_points: u32,
    pub summary: String,
}

impl fmt::Display for PlanningLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PLANNING;{};{};{};{}",
            self.fiscal_year, self.key, self.story_points, self.summary
        )
    }
}

/// The assembled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,

    /// Jira base URL used for issue links
    pub jira_url: String,

    /// Grid columns
    pub fiscal_years: Vec<String>,

    /// Grid rows, in configured WBS order
    pub rows: Vec<WbsRow>,

    /// Epics that fit no cell
    pub orphans: Vec<ClassifiedEntry>,

    pub totals: StoryPointTotals,

    /// `None` when milestones were not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestones: Option<MilestonePlan>,

    #[serde(skip)]
    pub planning: Vec<PlanningLine>,
}

impl Report {
    /// An empty grid for the configured rows and columns.
    pub fn new(settings: &ReportSettings) -> Self {
        let rows = settings
            .wbs
            .iter()
            .map(|area| WbsRow {
                area: area.clone(),
                cells: settings
                    .fiscal_years
                    .iter()
                    .map(|fy| Cell {
                        fiscal_year: fy.clone(),
                        entries: Vec::new(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            title: settings.title.clone(),
            jira_url: settings.jira_url.value.trim_end_matches('/').to_string(),
            fiscal_years: settings.fiscal_years.clone(),
            rows,
            orphans: Vec::new(),
            totals: StoryPointTotals::new(&settings.fiscal_years),
            milestones: None,
            planning: Vec::new(),
        }
    }

    /// Classify `epics` and group `milestones` into a full report.
    ///
    /// Pass `None` for `milestones` to leave the milestone row out.
    pub fn build(epics: &[Issue], milestones: Option<&[Issue]>, settings: &ReportSettings) -> Self {
        let statuses = StatusIndex::build(epics);
        debug!(statuses = statuses.len(), "status index built");
        let classifier = Classifier::new(settings, &statuses);
        let mut report = Self::new(settings);

        for issue in epics {
            match classifier.classify(issue) {
                Classification::Discarded(reason) => {
                    debug!(key = %issue.key, ?reason, "discarding issue");
                }
                classification => report.insert(classification),
            }
        }

        report.milestones =
            milestones.map(|issues| MilestonePlan::from_issues(issues, &settings.fiscal_years));

        debug!(
            placed = report.placed_count(),
            orphans = report.orphans.len(),
            "report assembled"
        );
        report
    }

    /// Record one classification result.
    ///
    /// A placement naming a cell that does not exist becomes an orphan.
    pub fn insert(&mut self, classification: Classification) {
        match classification {
            Classification::Placed {
                wbs,
                fiscal_year,
                entry,
            } => {
                let Some(cell) = self.cell_mut(&wbs, &fiscal_year) else {
                    debug!(key = %entry.key, %wbs, %fiscal_year, "no such cell, treating as orphan");
                    self.orphans.push(entry);
                    return;
                };
                let line = PlanningLine {
                    fiscal_year: fiscal_year.clone(),
                    key: entry.key.clone(),
                    story_points: entry.story_points,
                    summary: entry.summary.clone(),
                };
                let points = entry.story_points;
                cell.entries.push(entry);
                self.totals.add(&fiscal_year, points);
                self.planning.push(line);
            }
            Classification::Orphan(entry) => {
                debug!(key = %entry.key, summary = %entry.summary, "orphan");
                self.orphans.push(entry);
            }
            Classification::Discarded(_) => {}
        }
    }

    fn cell_mut(&mut self, wbs: &str, fiscal_year: &str) -> Option<&mut Cell> {
        self.rows
            .iter_mut()
            .find(|row| row.area.code == wbs)?
            .cells
            .iter_mut()
            .find(|cell| cell.fiscal_year == fiscal_year)
    }

    #[cfg(test)]
    fn cell(&self, wbs: &str, fiscal_year: &str) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|row| row.area.code == wbs)?
            .cells
            .iter()
            .find(|cell| cell.fiscal_year == fiscal_year)
    }

    /// Every entry placed in the grid.
    pub fn placed(&self) -> impl Iterator<Item = &ClassifiedEntry> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .flat_map(|cell| cell.entries.iter())
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.jira_url, key)
    }
}
