//! Text rendering for dump and verify results.

use crate::symlink::{AuditSummary, Finding, RepairOutcome, SymlinkStatus, SymlinkTally};
use crate::tooling::dump::{DumpReport, SpaceDump};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_space_header(dump: &SpaceDump) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    let rows = [
        ("Space", format!("{}/{}", dump.info.space_type, dump.info.name)),
        ("User", dump.info.user.clone()),
        ("Root", dump.space.nodes_dir.display().to_string()),
        ("Size", dump.info.human_size()),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    format!("{}\n", table)
}

/// Full dump output, with a notice when the filters matched no space.
pub fn format_dump_report(
    report: &DumpReport,
    space_filter: Option<&str>,
    user_filter: Option<&str>,
    info_only: bool,
) -> String {
    let mut out = String::new();
    for dump in &report.spaces {
        out.push_str(&format_space_header(dump));
        if info_only {
            out.push('\n');
            continue;
        }
        for (i, entry) in dump.entries.iter().enumerate() {
            if entry.blob_exists {
                out.push_str(&format!("{} {}\n", i + 1, entry.logical_path()));
            } else {
                out.push_str(&format!(
                    "{} {} {}\n",
                    i + 1,
                    entry.logical_path(),
                    "(DNE)".red()
                ));
            }
        }
        if dump.copy_failures() > 0 {
            out.push_str(&format!(
                "{} files could not be copied (see log)\n",
                dump.copy_failures()
            ));
        }
        if dump.resolve_issues > 0 {
            out.push_str(&format!(
                "{} records could not be resolved (see log)\n",
                dump.resolve_issues
            ));
        }
        out.push_str(&format!(
            "exist: {}, missing: {}\n\n",
            dump.existing(),
            dump.missing()
        ));
    }

    for (nodes, error) in &report.unreadable {
        out.push_str(&format!("Unreadable space {}: {}\n", nodes.display(), error));
    }

    if report.spaces.is_empty() {
        if let Some(filter) = space_filter {
            out.push_str(&format!("No space name matched '{}'\n", filter));
        }
        if let Some(filter) = user_filter {
            out.push_str(&format!("No user matched '{}'\n", filter));
        }
        if space_filter.is_none() && user_filter.is_none() {
            out.push_str("No spaces found\n");
        }
    }
    if let Some(output) = &report.output {
        out.push_str(&format!("Output: {}\n", output.display()));
    }
    out
}

pub fn format_tally(tally: &SymlinkTally) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Exists", "Symlinks", "Expected", "Fixed", "Skipped", "Errors"]);
    table.add_row(vec![
        tally.exists.to_string(),
        tally.actual.to_string(),
        tally.theoretical.to_string(),
        tally.fixed.to_string(),
        tally.ineligible.to_string(),
        tally.errors.to_string(),
    ]);
    format!("{}\n", table)
}

fn describe_status(status: &SymlinkStatus) -> String {
    match status {
        SymlinkStatus::Missing => "missing".to_string(),
        SymlinkStatus::WrongTarget { actual: Some(actual) } => {
            format!("points to {}", actual.display())
        }
        SymlinkStatus::WrongTarget { actual: None } => "not a symlink".to_string(),
        SymlinkStatus::Correct => "correct".to_string(),
    }
}

fn describe_outcome(outcome: &RepairOutcome) -> String {
    match outcome {
        RepairOutcome::AlreadyCorrect => "already correct".to_string(),
        RepairOutcome::Fixed { removed: None } => "created".to_string(),
        RepairOutcome::Fixed {
            removed: Some(removed),
        } => format!("replaced {:?}", removed),
        RepairOutcome::Unverified { actual } => match actual {
            Some(actual) => format!("unverified, reads {}", actual.display()),
            None => "unverified, unreadable".to_string(),
        },
        RepairOutcome::Skipped { reason } => format!("skipped: {}", reason),
    }
}

/// Per-record diagnostics, the totals table, and the consistency warning.
pub fn format_audit_summary(summary: &AuditSummary) -> String {
    let mut out = String::new();
    for finding in &summary.findings {
        let line = match finding {
            Finding::Divergent { report, .. } => format!(
                "{} -> {} ({})",
                report.expected.location.display(),
                report.expected.target.display(),
                describe_status(report.status())
            ),
            Finding::Repaired {
                report, outcome, ..
            } => format!(
                "{} -> {} ({})",
                report.expected.location.display(),
                report.expected.target.display(),
                describe_outcome(outcome)
            ),
            Finding::Failed { record, error } => {
                format!("{}: {}", record.display(), error.red())
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    if !summary.findings.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!(
        "{}\n\n",
        format_section_heading(&format!("Symlinks ({} spaces)", summary.spaces))
    ));
    out.push_str(&format_tally(&summary.tally));
    if !summary.tally.is_consistent() {
        out.push_str(&format!(
            "{}\n",
            "Warning: symlink counts are inconsistent".yellow()
        ));
    }
    out
}
