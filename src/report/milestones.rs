//! Long-range planning milestones, grouped by fiscal year.
//!
//! A milestone's fiscal year comes from its first fix version, which names
//! a cycle: fix version "W16" puts the milestone under FY16.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{Issue, Milestone};

/// Milestones of one fiscal year, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneYear {
    pub fiscal_year: String,
    pub milestones: Vec<Milestone>,
}

/// Milestones for every grid column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestonePlan {
    years: Vec<MilestoneYear>,
}

/// Fiscal year named by a fix version such as "W16" → "FY16".
fn fiscal_year_of_version(version: &str) -> Option<String> {
    let mut chars = version.chars();
    chars.next()?;
    let year = chars.as_str();
    if year.is_empty() {
        None
    } else {
        Some(format!("FY{}", year))
    }
}

impl MilestonePlan {
    pub fn new(fiscal_years: &[String]) -> Self {
        Self {
            years: fiscal_years
                .iter()
                .map(|fy| MilestoneYear {
                    fiscal_year: fy.clone(),
                    milestones: Vec::new(),
                })
                .collect(),
        }
    }

    /// Group milestone issues by fiscal year.
    ///
    /// Issues with no fix version, or whose fiscal year is not a column,
    /// are skipped with a warning.
    pub fn from_issues(issues: &[Issue], fiscal_years: &[String]) -> Self {
        let mut plan = Self::new(fiscal_years);

        for issue in issues {
            let Some(version) = issue.first_fix_version() else {
                warn!(key = %issue.key, "milestone has no fix version, skipping");
                continue;
            };
            let milestone = Milestone {
                key: issue.key.clone(),
                summary: issue.summary().to_string(),
            };
            let placed = fiscal_year_of_version(version)
                .is_some_and(|fy| plan.push(&fy, milestone));
            if !placed {
                warn!(
                    key = %issue.key,
                    version,
                    "milestone fix version is outside the reported fiscal years, skipping"
                );
            }
        }

        debug!(
            fetched = issues.len(),
            placed = plan.len(),
            "milestones grouped"
        );
        for year in &plan.years {
            let listed: Vec<String> = year
                .milestones
                .iter()
                .map(|m| format!("({}, {})", m.key, m.summary))
                .collect();
            info!(fiscal_year = %year.fiscal_year, milestones = %listed.join(" "), "planning milestones");
        }

        plan
    }

    /// Append a milestone to a fiscal year. Returns false if the year is not a column.
    pub fn push(&mut self, fiscal_year: &str, milestone: Milestone) -> bool {
        match self.years.iter_mut().find(|y| y.fiscal_year == fiscal_year) {
            Some(year) => {
                year.milestones.push(milestone);
                true
            }
            None => false,
        }
    }

    pub fn for_year(&self, fiscal_year: &str) -> &[Milestone] {
        self.years
            .iter()
            .find(|y| y.fiscal_year == fiscal_year)
            .map(|y| y.milestones.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.years.iter().map(|y| y.milestones.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn milestone_issue(key: &str, summary: &str, versions: &[&str]) -> Issue {
        let versions: Vec<_> = versions.iter().map(|v| json!({"name": v})).collect();
        serde_json::from_value(json!({
            "key": key,
            "fields": {
                "summary": summary,
                "status": {"name": "To Do"},
                "fixVersions": versions
            }
        }))
        .unwrap()
    }

    fn years() -> Vec<String> {
        vec!["FY16".to_string(), "FY17".to_string()]
    }

    #[test]
    fn test_fiscal_year_of_version() {
        assert_eq!(fiscal_year_of_version("W16"), Some("FY16".to_string()));
        assert_eq!(fiscal_year_of_version("S17"), Some("FY17".to_string()));
        assert_eq!(fiscal_year_of_version("W"), None);
        assert_eq!(fiscal_year_of_version(""), None);
    }

    #[test]
    fn test_group_by_first_fix_version() {
        let issues = vec![
            milestone_issue("DLP-1", "Alpha", &["W16", "S17"]),
            milestone_issue("DLP-2", "Beta", &["S17"]),
            milestone_issue("DLP-3", "Gamma", &["W16"]),
        ];
        let plan = MilestonePlan::from_issues(&issues, &years());

        let fy16: Vec<&str> = plan.for_year("FY16").iter().map(|m| m.key.as_str()).collect();
        let fy17: Vec<&str> = plan.for_year("FY17").iter().map(|m| m.key.as_str()).collect();
        assert_eq!(fy16, vec!["DLP-1", "DLP-3"]);
        assert_eq!(fy17, vec!["DLP-2"]);
        assert_eq!(plan.for_year("FY16")[0].summary, "Alpha");
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_skip_unplaceable_milestones() {
        let issues = vec![
            milestone_issue("DLP-4", "No version", &[]),
            milestone_issue("DLP-5", "Too late", &["W30"]),
        ];
        let plan = MilestonePlan::from_issues(&issues, &years());

        assert_eq!(plan.len(), 0);
        assert!(plan.for_year("FY30").is_empty());
    }
}
