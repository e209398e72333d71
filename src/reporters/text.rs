//! Text (terminal) reporter with colors and formatting

use super::Report;
use crate::log::FilteredLog;
use crate::models::{Blames, FileStatistics, ReferencePoint, RepositoryStatistics, EMPTY};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

const RULE: &str = "──────────────────────────────────────";

/// Render report as formatted terminal output
pub fn render(report: &Report<'_>) -> Result<String> {
    Ok(render_at(report, Utc::now()))
}

/// Render with a fixed clock, used for file ages.
pub fn render_at(report: &Report<'_>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    match report {
        Report::Blame {
            revision,
            interrupted,
            blames,
        } => render_blames(&mut out, revision, *interrupted, blames),
        Report::Mining {
            revision,
            interrupted,
            statistics,
        } => render_statistics(&mut out, revision, *interrupted, statistics, now),
        Report::Reference {
            branch,
            reference_point,
            log,
        } => render_reference(&mut out, branch, reference_point, log),
        Report::Files { revision, files } => render_files(&mut out, revision, files),
    }
    out
}

fn header(out: &mut String, title: &str, revision: &str) {
    out.push_str(&format!("\n{BOLD}{title}{RESET} {DIM}at {revision}{RESET}\n"));
    out.push_str(&format!("{DIM}{RULE}{RESET}\n"));
}

fn interruption_notice(out: &mut String, interrupted: bool) {
    if interrupted {
        out.push_str(&format!("{YELLOW}Interrupted: results are partial{RESET}\n\n"));
    }
}

fn render_blames(out: &mut String, revision: &str, interrupted: bool, blames: &Blames) {
    header(out, "Git Blame", revision);
    interruption_notice(out, interrupted);

    if blames.is_empty() {
        out.push_str(&format!("{DIM}No blame results{RESET}\n"));
    }
    for file in blames.iter() {
        out.push_str(&format!("{BOLD}{}{RESET}\n", file.file_name()));
        for (line, blame) in file.iter() {
            let location = if line <= 0 {
                "file".to_string()
            } else {
                line.to_string()
            };
            out.push_str(&format!(
                "  {:>5}  {}  {} <{}>  {DIM}{}{RESET}\n",
                location,
                short_commit(&blame.commit),
                blame.name,
                blame.email,
                format_date(blame.time),
            ));
        }
    }

    render_log(out, blames.log());
}

fn render_statistics(
    out: &mut String,
    revision: &str,
    interrupted: bool,
    statistics: &RepositoryStatistics,
    now: DateTime<Utc>,
) {
    header(out, "Repository Statistics", revision);
    interruption_notice(out, interrupted);

    out.push_str(&format!(
        "Files: {}  Commits: {}  Churn: {}  Last change: {}\n\n",
        statistics.len(),
        statistics.total_commits(),
        statistics.total_churn(),
        statistics
            .latest_modification()
            .map(format_date)
            .unwrap_or_else(|| EMPTY.to_string()),
    ));

    if !statistics.is_empty() {
        out.push_str(&format!(
            "{BOLD}{:>7} {:>7} {:>8} {:>8} {:>7} {:>7}  FILE{RESET}\n",
            "AUTHORS", "COMMITS", "AGE", "MODIFIED", "ADDED", "DELETED"
        ));
    }
    for file in statistics.iter() {
        render_file_statistics(out, file, now);
    }

    render_log(out, statistics.log());
}

fn render_file_statistics(out: &mut String, file: &FileStatistics, now: DateTime<Utc>) {
    out.push_str(&format!(
        "{:>7} {:>7} {:>8} {:>8} {GREEN}{:>7}{RESET} {RED}{:>7}{RESET}  {}\n",
        file.number_of_authors,
        file.number_of_commits,
        format_days(file.age_in_days(now)),
        format_days(file.last_modified_in_days(now)),
        format!("+{}", file.added_lines),
        format!("-{}", file.deleted_lines),
        file.file_name,
    ));
}

fn render_reference(
    out: &mut String,
    branch: &str,
    reference_point: &ReferencePoint,
    log: &FilteredLog,
) {
    header(out, "Reference Point", branch);
    match reference_point {
        ReferencePoint::Found(commit) => {
            out.push_str(&format!("Latest shared commit: {GREEN}{commit}{RESET}\n"));
        }
        ReferencePoint::NotFound => {
            out.push_str(&format!(
                "{YELLOW}No commit shared with '{branch}' found{RESET}\n"
            ));
        }
    }
    render_log(out, log);
}

fn render_files(out: &mut String, revision: &str, files: &BTreeSet<String>) {
    header(out, "Tracked Files", revision);
    for file in files {
        out.push_str(file);
        out.push('\n');
    }
    out.push_str(&format!("\n{DIM}{} files{RESET}\n", files.len()));
}

fn render_log(out: &mut String, log: &FilteredLog) {
    if !log.has_errors() {
        return;
    }
    out.push_str(&format!("\n{BOLD}{RED}{}{RESET}\n", log.title()));
    for message in log.error_messages() {
        out.push_str(&format!("  {message}\n"));
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}

fn format_date(timestamp: i64) -> String {
    if timestamp == 0 {
        return EMPTY.to_string();
    }
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

fn format_days(days: Option<i64>) -> String {
    match days {
        Some(d) => format!("{d}d"),
        None => EMPTY.to_string(),
    }
}
