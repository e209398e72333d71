//! Files command implementation

use super::{Outcome, Session};
use anyhow::{Context, Result};
use git_forensics::config::DEFAULT_REVISION;
use git_forensics::git::{list_files, RepositoryHandle};
use git_forensics::reporters::{report_with_format, Report};

pub(super) fn run(session: &Session, revision: Option<String>) -> Result<Outcome> {
    let revision = revision.unwrap_or_else(|| DEFAULT_REVISION.to_string());

    let handle = RepositoryHandle::open(&session.path)
        .with_context(|| format!("Can't access the git repository at {}", session.path.display()))?;
    let commit = handle.resolve(&revision)?;
    let files = list_files(handle.repository(), commit)
        .with_context(|| format!("Can't list the files of {}", revision))?;

    let output = report_with_format(
        &Report::Files {
            revision: &revision,
            files: &files,
        },
        session.format,
    )?;
    println!("{}", output);
    Ok(Outcome::Completed)
}
