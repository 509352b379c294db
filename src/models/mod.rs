//! Data models for Epicgrid.
//!
//! This module defines:
//! - Jira wire types returned by the search endpoint (`SearchResponse`, `Issue`, ...)
//! - `Cycle` - the semiannual planning period an epic is scheduled in
//! - `ClassifiedEntry` - an epic after classification, ready for rendering
//! - `Milestone` - a long-range planning milestone shown under the grid

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Inward link description that marks the linked issue as a blocker.
pub const BLOCKED_BY_RELATION: &str = "is blocked by";

/// Status name of a completed issue.
pub const DONE_STATUS: &str = "Done";

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a Jira `/rest/api/2/search` response (only fields we care about).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matches reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    /// Returned issues, in server order
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
}

/// A single issue as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue key (e.g., "DM-1234")
    pub key: String,

    pub fields: IssueFields,
}

/// The `fields` object of an issue.
///
/// Custom fields (WBS code, story points) have instance-specific ids such as
/// `customfield_10500`, so they are kept in `custom` and looked up by the
/// configured field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,

    pub status: IssueStatus,

    #[serde(default, deserialize_with = "null_as_default")]
    pub issuelinks: Vec<IssueLink>,

    #[serde(
        default,
        rename = "fixVersions",
        deserialize_with = "null_as_default"
    )]
    pub fix_versions: Vec<FixVersion>,

    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixVersion {
    pub name: String,
}

/// A link between two issues.
///
/// Jira reports the other end of the link as either `inwardIssue` or
/// `outwardIssue` depending on direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLink {
    #[serde(rename = "type")]
    pub link_type: IssueLinkType,

    #[serde(default, rename = "inwardIssue", skip_serializing_if = "Option::is_none")]
    pub inward_issue: Option<LinkedIssue>,

    #[serde(default, rename = "outwardIssue", skip_serializing_if = "Option::is_none")]
    pub outward_issue: Option<LinkedIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueLinkType {
    #[serde(default)]
    pub name: String,
    /// Relation as read from the inward side (e.g., "is blocked by")
    #[serde(default)]
    pub inward: String,
    #[serde(default)]
    pub outward: String,
}

/// The abbreviated issue embedded in a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedIssue {
    pub key: String,
    #[serde(default)]
    pub fields: LinkedIssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedIssueFields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

impl Issue {
    pub fn summary(&self) -> &str {
        &self.fields.summary
    }

    pub fn status(&self) -> &str {
        &self.fields.status.name
    }

    pub fn is_done(&self) -> bool {
        self.status() == DONE_STATUS
    }

    /// WBS code stored in the given custom field, if it is a non-null string.
    pub fn wbs(&self, field: &str) -> Option<&str> {
        self.fields.custom.get(field).and_then(Value::as_str)
    }

    /// Story points stored in the given custom field.
    ///
    /// Missing or null values count as 0. Fractional values are truncated and
    /// negative values clamp to 0.
    pub fn story_points(&self, field: &str) -> u32 {
        let points = match self.fields.custom.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        points.map(|p| p.max(0.0) as u32).unwrap_or(0)
    }

    /// Issues this one is blocked by, in link order.
    pub fn blocked_by(&self) -> impl Iterator<Item = &LinkedIssue> {
        self.fields
            .issuelinks
            .iter()
            .filter(|link| link.link_type.inward == BLOCKED_BY_RELATION)
            .filter_map(|link| link.inward_issue.as_ref())
    }

    /// Name of the first fix version, if any.
    pub fn first_fix_version(&self) -> Option<&str> {
        self.fields.fix_versions.first().map(|v| v.name.as_str())
    }
}

/// Semiannual planning cycle an entry is scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cycle {
    #[serde(rename = "W")]
    Winter,
    #[serde(rename = "S")]
    Summer,
    /// Only the fiscal year is known
    #[serde(rename = "Y")]
    Unspecified,
}

impl Cycle {
    /// Order in which entries of a cell are listed.
    pub const RENDER_ORDER: [Cycle; 3] = [Cycle::Winter, Cycle::Summer, Cycle::Unspecified];

    /// Parse the season letter of a cycle label such as "W17".
    pub fn from_season(season: char) -> Option<Self> {
        match season {
            'W' => Some(Cycle::Winter),
            'S' => Some(Cycle::Summer),
            _ => None,
        }
    }

    pub fn tag(&self) -> char {
        match self {
            Cycle::Winter => 'W',
            Cycle::Summer => 'S',
            Cycle::Unspecified => 'Y',
        }
    }

    /// Font colour used for entries of this cycle.
    pub fn color(&self) -> &'static str {
        match self {
            Cycle::Winter => "c8682c",      // dark orange
            Cycle::Summer => "309124",      // green
            Cycle::Unspecified => "2c73c8", // blue
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

fn is_two_digits(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Check for a fiscal-year label of the form `FY<yy>` (e.g., "FY17").
pub fn is_fiscal_year_label(label: &str) -> bool {
    label.strip_prefix("FY").is_some_and(is_two_digits)
}

/// Parse a cycle label of the form `<season><yy>` (e.g., "W17").
///
/// Returns the season and the fiscal year the cycle belongs to ("FY17").
pub fn parse_cycle_label(label: &str) -> Option<(Cycle, String)> {
    let mut chars = label.chars();
    let cycle = Cycle::from_season(chars.next()?)?;
    let year = chars.as_str();
    if !is_two_digits(year) {
        return None;
    }
    Some((cycle, format!("FY{}", year)))
}

/// An epic after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    pub key: String,

    /// Summary with any fiscal-year or cycle prefix removed
    pub summary: String,

    /// Status name; `None` for a blocker whose key was not in the fetched set
    pub status: Option<String>,

    pub cycle: Cycle,

    pub story_points: u32,

    /// Epics blocking this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<ClassifiedEntry>,
}

impl ClassifiedEntry {
    pub fn new(
        key: impl Into<String>,
        summary: impl Into<String>,
        status: Option<String>,
        cycle: Cycle,
        story_points: u32,
    ) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status,
            cycle,
            story_points,
            blocked_by: Vec::new(),
        }
    }

    pub fn with_blockers(mut self, blocked_by: Vec<ClassifiedEntry>) -> Self {
        self.blocked_by = blocked_by;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some(DONE_STATUS)
    }
}

/// A long-range planning milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub key: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issue_json() -> &'static str {
        r#"{
            "key": "DM-1001",
            "fields": {
                "summary": "W17Build pipeline",
                "status": {"name": "In Progress"},
                "customfield_10500": "02C.06.02.03",
                "customfield_10202": 40.0,
                "issuelinks": [
                    {
                        "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                        "inwardIssue": {"key": "DM-900", "fields": {"summary": "Schema work"}}
                    },
                    {
                        "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                        "outwardIssue": {"key": "DM-1500", "fields": {"summary": "Downstream"}}
                    },
                    {
                        "type": {"name": "Relates", "inward": "relates to", "outward": "relates to"},
                        "inwardIssue": {"key": "DM-42", "fields": {"summary": "Related"}}
                    }
                ],
                "fixVersions": [{"name": "W17"}, {"name": "S18"}]
            }
        }"#
    }

    #[test]
    fn test_issue_deserialize() {
        let issue: Issue = serde_json::from_str(sample_issue_json()).unwrap();

        assert_eq!(issue.key, "DM-1001");
        assert_eq!(issue.summary(), "W17Build pipeline");
        assert_eq!(issue.status(), "In Progress");
        assert_eq!(issue.wbs("customfield_10500"), Some("02C.06.02.03"));
        assert_eq!(issue.story_points("customfield_10202"), 40);
        assert_eq!(issue.first_fix_version(), Some("W17"));
        assert!(!issue.is_done());
    }

    #[test]
    fn test_blocked_by_only_inward_blockers() {
        let issue: Issue = serde_json::from_str(sample_issue_json()).unwrap();

        let keys: Vec<&str> = issue.blocked_by().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["DM-900"]);
        assert_eq!(
            issue.blocked_by().next().unwrap().fields.summary,
            "Schema work"
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{
            "key": "DM-7",
            "fields": {
                "summary": "No extras",
                "status": {"name": "To Do"},
                "customfield_10500": null,
                "customfield_10202": null,
                "issuelinks": null
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.wbs("customfield_10500"), None);
        assert_eq!(issue.story_points("customfield_10202"), 0);
        assert_eq!(issue.story_points("customfield_99999"), 0);
        assert_eq!(issue.blocked_by().count(), 0);
        assert_eq!(issue.first_fix_version(), None);
    }

    #[test]
    fn test_story_points_truncate_and_clamp() {
        let json = r#"{
            "key": "DM-8",
            "fields": {
                "summary": "x",
                "status": {"name": "To Do"},
                "a": 12.9,
                "b": -3,
                "c": "7"
            }
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.story_points("a"), 12);
        assert_eq!(issue.story_points("b"), 0);
        assert_eq!(issue.story_points("c"), 7);
    }

    #[test]
    fn test_missing_status_is_an_error() {
        let json = r#"{"key": "DM-9", "fields": {"summary": "x"}}"#;
        assert!(serde_json::from_str::<Issue>(json).is_err());
    }

    #[test]
    fn test_search_response_defaults() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.issues.is_empty());
        assert!(response.total.is_none());
    }

    #[test]
    fn test_cycle_tags_and_colors() {
        assert_eq!(Cycle::from_season('W'), Some(Cycle::Winter));
        assert_eq!(Cycle::from_season('S'), Some(Cycle::Summer));
        assert_eq!(Cycle::from_season('Y'), None);
        assert_eq!(Cycle::Winter.color(), "c8682c");
        assert_eq!(Cycle::Summer.color(), "309124");
        assert_eq!(Cycle::Unspecified.color(), "2c73c8");
        assert_eq!(Cycle::Unspecified.to_string(), "Y");
        assert_eq!(
            serde_json::to_string(&Cycle::Winter).unwrap(),
            "\"W\""
        );
    }

    #[test]
    fn test_fiscal_year_labels() {
        assert!(is_fiscal_year_label("FY17"));
        assert!(!is_fiscal_year_label("FY7"));
        assert!(!is_fiscal_year_label("fy17"));
        assert!(!is_fiscal_year_label("FY17X"));
        assert!(!is_fiscal_year_label("W17"));
    }

    #[test]
    fn test_parse_cycle_label() {
        assert_eq!(
            parse_cycle_label("W17"),
            Some((Cycle::Winter, "FY17".to_string()))
        );
        assert_eq!(
            parse_cycle_label("S20"),
            Some((Cycle::Summer, "FY20".to_string()))
        );
        assert_eq!(parse_cycle_label("X17"), None);
        assert_eq!(parse_cycle_label("W1"), None);
        assert_eq!(parse_cycle_label("W1a"), None);
        assert_eq!(parse_cycle_label(""), None);
    }

    #[test]
    fn test_entry_is_done() {
        let done = ClassifiedEntry::new("DM-1", "x", Some("Done".to_string()), Cycle::Winter, 0);
        let unknown = ClassifiedEntry::new("DM-2", "y", None, Cycle::Unspecified, 0);
        assert!(done.is_done());
        assert!(!unknown.is_done());
    }
}
