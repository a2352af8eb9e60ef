//! Plain-text rendering of package reports for terminals.

use dtslint_types::ValidationRange;
use dtslint_types::report::{PackageReport, ReportStatus};

pub fn render_report_text(report: &PackageReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "dtslint {}: {}\n",
        report.package,
        status_label(report.status)
    ));

    if !report.ranges.is_empty() {
        out.push_str("\nRanges:\n");
        out.push_str(&render_ranges_text(&report.ranges));
    }

    if !report.versions_checked.is_empty() {
        let versions: Vec<String> = report
            .versions_checked
            .iter()
            .map(ToString::to_string)
            .collect();
        out.push_str(&format!("\nChecked: {}\n", versions.join(", ")));
    }

    if let Some(compat) = &report.compat {
        out.push_str(&format!(
            "Compatibility: {}{}\n",
            compat.status,
            if compat.expected_failure {
                " (expected failure)"
            } else {
                ""
            }
        ));
    }

    for message in &report.messages {
        out.push_str(&format!("\n{}\n", message.trim_end()));
    }
    for error in &report.errors {
        out.push_str(&format!("\nerror: {}\n", error.trim_end()));
    }

    out
}

/// One line per range: `low - high  directory`, with the root range marked.
pub fn render_ranges_text(ranges: &[ValidationRange]) -> String {
    let mut out = String::new();
    for r in ranges {
        let span = if r.low == r.high {
            r.low.to_string()
        } else {
            format!("{} - {}", r.low, r.high)
        };
        out.push_str(&format!(
            "  {:<14} {}{}\n",
            span,
            r.directory_label(),
            if r.is_latest { " (latest)" } else { "" }
        ));
    }
    out
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pass => "pass",
        ReportStatus::Fail => "FAIL",
        ReportStatus::Error => "ERROR",
    }
}
