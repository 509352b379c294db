//! Classification of epics into grid cells.
//!
//! An epic lands in the (WBS, fiscal year) cell named by its WBS field and
//! the prefix of its summary:
//!
//! - `FY17Build pipeline` goes to FY17 with no specific cycle
//! - `W17Build pipeline` goes to FY17, winter cycle
//!
//! The fiscal-year prefix is checked before the cycle prefix. Anything with
//! an unknown WBS code or no recognised prefix is an orphan.

use std::collections::HashMap;

use crate::config::ReportSettings;
use crate::models::{ClassifiedEntry, Cycle, Issue, parse_cycle_label};

/// Summaries containing this marker are never reported.
pub const KPM_MEASUREMENT_MARKER: &str = "KPM Measurement";

/// Read-only key → status lookup built from the fetched epics.
///
/// Used to resolve the status of blocking epics, whose link payload does
/// not carry it.
#[derive(Debug, Clone, Default)]
pub struct StatusIndex {
    statuses: HashMap<String, String>,
}

impl StatusIndex {
    pub fn build(issues: &[Issue]) -> Self {
        let statuses = issues
            .iter()
            .map(|issue| (issue.key.clone(), issue.status().to_string()))
            .collect();
        Self { statuses }
    }

    pub fn status_of(&self, key: &str) -> Option<&str> {
        self.statuses.get(key).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.statuses.len()
    }
}

/// Why an issue was left out of the report entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Status is Done and done epics are hidden
    Done,
    /// Summary contains the KPM measurement marker
    KpmMeasurement,
}

/// Outcome of classifying one issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Placed {
        wbs: String,
        fiscal_year: String,
        entry: ClassifiedEntry,
    },
    Orphan(ClassifiedEntry),
    Discarded(DiscardReason),
}

/// Split off the first `n` characters of `s`.
///
/// Returns `None` if `s` is shorter than `n` characters.
pub fn split_prefix(s: &str, n: usize) -> Option<(&str, &str)> {
    let end = s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len());
    let prefix = &s[..end];
    if prefix.chars().count() == n {
        Some((prefix, &s[end..]))
    } else {
        None
    }
}

/// Classifies issues against the configured WBS areas, fiscal years and cycles.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    settings: &'a ReportSettings,
    statuses: &'a StatusIndex,
}

impl<'a> Classifier<'a> {
    pub fn new(settings: &'a ReportSettings, statuses: &'a StatusIndex) -> Self {
        Self { settings, statuses }
    }

    fn is_known_wbs(&self, code: &str) -> bool {
        self.settings.wbs.iter().any(|area| area.code == code)
    }

    fn is_fiscal_year(&self, label: &str) -> bool {
        self.settings.fiscal_years.iter().any(|fy| fy == label)
    }

    fn is_cycle(&self, label: &str) -> bool {
        self.settings.cycles.iter().any(|c| c == label)
    }

    pub fn classify(&self, issue: &Issue) -> Classification {
        if issue.is_done() && !self.settings.show_done() {
            return Classification::Discarded(DiscardReason::Done);
        }
        if issue.summary().contains(KPM_MEASUREMENT_MARKER) {
            return Classification::Discarded(DiscardReason::KpmMeasurement);
        }

        let story_points = issue.story_points(&self.settings.story_points_field);
        let blocked_by = if self.settings.show_blockers() {
            self.blockers_of(issue, story_points)
        } else {
            Vec::new()
        };
        let status = Some(issue.status().to_string());
        let summary = issue.summary();

        let wbs = issue
            .wbs(&self.settings.wbs_field)
            .filter(|code| self.is_known_wbs(code));

        if let Some(wbs) = wbs {
            if let Some((prefix, rest)) = split_prefix(summary, 4) {
                if self.is_fiscal_year(prefix) {
                    let entry = ClassifiedEntry::new(
                        &issue.key,
                        rest,
                        status,
                        Cycle::Unspecified,
                        story_points,
                    )
                    .with_blockers(blocked_by);
                    return Classification::Placed {
                        wbs: wbs.to_string(),
                        fiscal_year: prefix.to_string(),
                        entry,
                    };
                }
            }

            if let Some((prefix, rest)) = split_prefix(summary, 3) {
                if let Some((cycle, fiscal_year)) =
                    parse_cycle_label(prefix).filter(|_| self.is_cycle(prefix))
                {
                    if self.is_fiscal_year(&fiscal_year) {
                        let entry =
                            ClassifiedEntry::new(&issue.key, rest, status, cycle, story_points)
                                .with_blockers(blocked_by);
                        return Classification::Placed {
                            wbs: wbs.to_string(),
                            fiscal_year,
                            entry,
                        };
                    }
                }
            }
        }

        Classification::Orphan(
            ClassifiedEntry::new(&issue.key, summary, status, Cycle::Unspecified, story_points)
                .with_blockers(blocked_by),
        )
    }

    /// Entries for the epics blocking `issue`.
    ///
    /// Blocker entries carry the story points of the blocked issue.
    fn blockers_of(&self, issue: &Issue, story_points: u32) -> Vec<ClassifiedEntry> {
        issue
            .blocked_by()
            .map(|linked| {
                let status = self.statuses.status_of(&linked.key).map(str::to_string);
                if status.is_none() {
                    tracing::debug!(
                        blocked = %issue.key,
                        blocker = %linked.key,
                        "blocker status unknown"
                    );
                }
                ClassifiedEntry::new(
                    &linked.key,
                    &linked.fields.summary,
                    status,
                    Cycle::Unspecified,
                    story_points,
                )
            })
            .collect()
    }
}
