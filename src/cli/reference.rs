//! Reference command implementation

use super::{spinner, Outcome, Session};
use anyhow::{Context, Result};
use git_forensics::git::{find_reference_point, ReferenceSearch, RepositoryHandle};
use git_forensics::log::FilteredLog;
use git_forensics::reporters::{report_with_format, Report};

pub(super) fn run(
    session: &Session,
    branch: Option<String>,
    max_commits: Option<usize>,
) -> Result<Outcome> {
    let branch = branch.unwrap_or_else(|| session.config.reference_branch().to_string());
    let max_commits = max_commits.or(session.config.reference_max_commits());

    let handle = RepositoryHandle::open(&session.path)
        .with_context(|| format!("Can't access the git repository at {}", session.path.display()))?;

    let mut search = ReferenceSearch::new(&branch);
    if let Some(max) = max_commits {
        search = search.with_max_commits(max);
    }

    let mut log = FilteredLog::with_max_lines(
        "Errors while searching for a reference point:",
        session.config.max_logged_errors(),
    );
    let progress = spinner(format!("Searching for a reference point on '{}'...", branch));
    let result = find_reference_point(&handle, &search, &mut log);
    progress.finish_and_clear();

    let reference_point =
        result.with_context(|| format!("Can't find a reference point on '{}'", branch))?;

    let output = report_with_format(
        &Report::Reference {
            branch: &branch,
            reference_point: &reference_point,
            log: &log,
        },
        session.format,
    )?;
    println!("{}", output);
    Ok(Outcome::Completed)
}
