//! Story-point totals and FTE conversions.
//!
//! One FTE-month is 26.3 story points.

use serde::{Deserialize, Serialize};

pub const STORY_POINTS_PER_FTE_MONTH: f64 = 26.3;
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Below this fractional part an FTE figure is printed as a whole number.
const WHOLE_NUMBER_THRESHOLD: f64 = 0.05;

pub fn fte_months(story_points: u64) -> f64 {
    story_points as f64 / STORY_POINTS_PER_FTE_MONTH
}

pub fn fte_years(story_points: u64) -> f64 {
    fte_months(story_points) / MONTHS_PER_YEAR
}

/// FTE-month label shown next to an epic.
///
/// Whole number (truncated) when the fraction is under 0.05, otherwise one
/// decimal: 0 → "0", 40 → "1.5", 79 → "3".
pub fn fte_months_label(story_points: u64) -> String {
    let months = fte_months(story_points);
    if months.fract() < WHOLE_NUMBER_THRESHOLD {
        format!("{}", months.trunc() as u64)
    } else {
        format!("{:.1}", months)
    }
}

/// Story points placed in one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYearTotal {
    pub fiscal_year: String,
    pub story_points: u64,
}

impl FiscalYearTotal {
    /// Whole FTE-months, truncated.
    pub fn fte_months_whole(&self) -> u64 {
        fte_months(self.story_points).trunc() as u64
    }

    /// FTE-years with one decimal.
    pub fn fte_years_label(&self) -> String {
        format!("{:.1}", fte_years(self.story_points))
    }
}

/// Per-fiscal-year story-point accumulator, in column order.
///
/// Only placed epics are counted; orphans never contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryPointTotals {
    years: Vec<FiscalYearTotal>,
}

impl StoryPointTotals {
    pub fn new(fiscal_years: &[String]) -> Self {
        Self {
            years: fiscal_years
                .iter()
                .map(|fy| FiscalYearTotal {
                    fiscal_year: fy.clone(),
                    story_points: 0,
                })
                .collect(),
        }
    }

    /// Add points to a fiscal year. Returns false if the year is not tracked.
    pub fn add(&mut self, fiscal_year: &str, story_points: u32) -> bool {
        match self.years.iter_mut().find(|t| t.fiscal_year == fiscal_year) {
            Some(total) => {
                total.story_points += u64::from(story_points);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, fiscal_year: &str) -> Option<u64> {
        self.years
            .iter()
            .find(|t| t.fiscal_year == fiscal_year)
            .map(|t| t.story_points)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FiscalYearTotal> {
        self.years.iter()
    }

    pub fn grand_total(&self) -> u64 {
        self.years.iter().map(|t| t.story_points).sum()
    }
}
