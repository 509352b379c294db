//! HTML rendering.
//!
//! The output is a plain HTML 4 style document: the WBS × fiscal-year
//! table, the milestone row, a story-point breakdown table, the orphan list
//! and a colour legend. Text is inserted as-is, without escaping.

use chrono::{DateTime, Utc};

use crate::models::ClassifiedEntry;
use crate::report::aggregate::{STORY_POINTS_PER_FTE_MONTH, fte_months_label};
use crate::report::{Cell, Report};

const LIST_STYLE: &str = "list-item-style:none; margin-left:0px;padding-left:20px;";
const MILESTONE_BGCOLOR: &str = "#BEBEBE";

/// One epic line: coloured link with its FTE-month figure, struck through
/// when done.
fn entry_line(report: &Report, entry: &ClassifiedEntry) -> String {
    let (strike_start, strike_stop) = if entry.is_done() {
        ("<strike>", "</strike>")
    } else {
        ("", "")
    };
    format!(
        r#"{}<a href="{}"><font color="{}">{} ({})</font></a>{}"#,
        strike_start,
        report.browse_url(&entry.key),
        entry.cycle.color(),
        entry.summary,
        fte_months_label(u64::from(entry.story_points)),
        strike_stop
    )
}

fn render_cell(html: &mut String, report: &Report, cell: &Cell) {
    if cell.is_empty() {
        html.push_str("\n    <td valign=\"top\">&nbsp;</td>");
        return;
    }

    html.push_str(&format!(
        "\n    <td valign=\"top\">\n      <ul style=\"{}\">",
        LIST_STYLE
    ));
    for entry in cell.entries_by_cycle() {
        html.push_str(&format!("\n        <li>{}</li>", entry_line(report, entry)));
        if !entry.blocked_by.is_empty() {
            html.push_str("\n          <ul>");
            for blocker in &entry.blocked_by {
                html.push_str(&format!(
                    "\n            <li><small><i>{}</i></small></li>",
                    entry_line(report, blocker)
                ));
            }
            html.push_str("\n          </ul>");
        }
    }
    html.push_str("\n      </ul></td>");
}

fn render_grid(html: &mut String, report: &Report) {
    html.push_str("\n<table border='1'>\n  <tr>\n    <td></td>");
    for fy in &report.fiscal_years {
        html.push_str(&format!(
            "\n    <td align='middle' width='15%'>{}</td>",
            fy
        ));
    }
    html.push_str("\n  </tr>");

    for row in &report.rows {
        html.push_str(&format!(
            "\n  <tr>\n    <td valign=\"top\">{}<br>{}</td>",
            row.area.code, row.area.name
        ));
        for cell in &row.cells {
            render_cell(html, report, cell);
        }
        html.push_str("\n  </tr>");
    }

    if let Some(ref plan) = report.milestones {
        html.push_str(&format!(
            "\n  <tr>\n      <td valign=\"top\" bgcolor=\"{}\">DLP milestones</td>\n",
            MILESTONE_BGCOLOR
        ));
        for fy in &report.fiscal_years {
            html.push_str(&format!(
                "\n      <td valign=\"top\" bgcolor=\"{}\"><ul style=\"{}\">\n",
                MILESTONE_BGCOLOR, LIST_STYLE
            ));
            for milestone in plan.for_year(fy) {
                html.push_str(&format!(
                    "\n        <li><a href=\"{}\">{}</a></li>\n",
                    report.browse_url(&milestone.key),
                    milestone.summary
                ));
            }
            html.push_str("\n      </ul></td>\n");
        }
        html.push_str("\n  </tr>");
    }

    html.push_str("\n</table>\n");
}

fn render_totals(html: &mut String, report: &Report) {
    html.push_str(
        "\n<p>Breakdown of story points per FY:\n<table border='1'>\n\
         <tr><td align='middle'>FY<td align='middle'>story points\
         <td align='middle'>FTE-months<td align='middle'>FTE-years\n",
    );
    for total in report.totals.iter() {
        html.push_str(&format!(
            "\n    <tr><td align='middle'>{}<td align='middle'>{}\
             <td align='middle'>{}<td align='middle'>{}\n",
            total.fiscal_year,
            total.story_points,
            total.fte_months_whole(),
            total.fte_years_label()
        ));
    }
    html.push_str("\n</table>\n");
}

fn render_orphans(html: &mut String, report: &Report) {
    html.push_str("\n<p>The following did not make it to the above table:\n<ul>\n");
    for orphan in &report.orphans {
        html.push_str(&format!(
            "\n      <li><a href=\"{}\">{}</a></li>",
            report.browse_url(&orphan.key),
            orphan.summary
        ));
    }
    html.push_str("\n</ul></p>\n");
}

/// Render the report as an HTML document.
///
/// Output depends only on the arguments: rows follow configured WBS order,
/// columns follow configured fiscal-year order, and each cell lists winter,
/// then summer, then unspecified-cycle entries.
pub fn render_html(report: &Report, generated_at: DateTime<Utc>) -> String {
    let mut html = format!(
        "\n\n<html>\n<head>\n<title>{}</title>\n</head>\n<body>\n\
         <!-- generated by epicgrid {} at {} -->\n",
        report.title,
        env!("CARGO_PKG_VERSION"),
        generated_at.format("%Y-%m-%dT%H:%M:%SZ")
    );

    render_grid(&mut html, report);
    render_totals(&mut html, report);
    render_orphans(&mut html, report);

    html.push_str(&format!(
        "<p>\nExplanation: orange color - winter cycle, green color - summer cycle, \
         blue color - cycle not specified.</p>\n\n\
         The numbers next to epics in brackets: effort expressed in FTE-months, \
         where 1 FTE month = {} story points\n\n</body>\n</html>\n",
        STORY_POINTS_PER_FTE_MONTH
    ));

    html
}
