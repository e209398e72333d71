//! Blame command implementation

use super::{spinner, Outcome, Session};
use anyhow::{Context, Result};
use git_forensics::models::LocationSet;
use git_forensics::reporters::{report_with_format, Report};
use git_forensics::scm::ScmRegistry;
use std::path::Path;

pub(super) fn run(
    session: &Session,
    revision: Option<String>,
    locations: Vec<(String, i32)>,
    locations_file: Option<&Path>,
) -> Result<Outcome> {
    let revision = revision.unwrap_or_else(|| session.config.blame_revision().to_string());

    let mut requested: LocationSet = locations.into_iter().collect();
    if let Some(file) = locations_file {
        for (path, line) in read_locations(file)? {
            requested.add_line(path, line);
        }
    }

    let registry = ScmRegistry::with_defaults();
    let blamer = registry.blamer(session.scm.as_deref(), &session.context(&revision));

    let progress = spinner(format!("Blaming {} files...", requested.len()));
    let result = blamer.blame(&requested, &session.token);
    progress.finish_and_clear();

    let (blames, outcome) = match result {
        Ok(blames) => (blames, Outcome::Completed),
        Err(interrupted) => (interrupted.into_partial(), Outcome::Interrupted),
    };

    let output = report_with_format(
        &Report::Blame {
            revision: &revision,
            interrupted: matches!(outcome, Outcome::Interrupted),
            blames: &blames,
        },
        session.format,
    )?;
    println!("{}", output);
    Ok(outcome)
}

/// Read `path:line` entries, skipping blank lines and comments.
fn read_locations(file: &Path) -> Result<Vec<(String, i32)>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read locations file {}", file.display()))?;
    Ok(content.lines().filter_map(LocationSet::parse_entry).collect())
}
