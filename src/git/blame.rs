//! Line-level attribution with git blame
//!
//! For every requested line the blame at a fixed revision provides the
//! author and commit that last touched it. Requests for line `<= 0` are
//! answered with the last commit that touched the whole file. Lines beyond
//! the end of the file keep empty placeholders.

use crate::batch::{BatchOutcome, BatchRunner, CancellationToken, Interrupted};
use crate::git::history::last_commit;
use crate::git::repository::{with_repository, RepositoryHandle};
use crate::log::FilteredLog;
use crate::models::{Blames, FileBlame, LineBlame, LocationSet, EMPTY};
use git2::{BlameOptions, Commit, ErrorCode, Oid, Repository, Signature};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Name and email of a signature, or None if both are blank.
fn person(signature: &Signature<'_>) -> Option<(String, String)> {
    let name = signature.name().map(str::trim).filter(|s| !s.is_empty());
    let email = signature.email().map(str::trim).filter(|s| !s.is_empty());
    if name.is_none() && email.is_none() {
        return None;
    }
    Some((
        name.unwrap_or(EMPTY).to_string(),
        email.unwrap_or(EMPTY).to_string(),
    ))
}

/// Author of a commit, falling back to its committer.
fn commit_person(commit: &Commit<'_>) -> Option<(String, String)> {
    person(&commit.author()).or_else(|| person(&commit.committer()))
}

/// Blame the requested lines of one file at `head`.
///
/// `file_name` is the key used in the result, `relative_path` the path inside
/// the repository. Returns `Ok(None)` when git has no blame for the file.
pub fn blame_file(
    repo: &Repository,
    head: Oid,
    file_name: &str,
    relative_path: &str,
    lines: &BTreeSet<i32>,
    log: &mut FilteredLog,
) -> Result<Option<FileBlame>, git2::Error> {
    let mut opts = BlameOptions::new();
    opts.newest_commit(head);

    let blame = match repo.blame_file(Path::new(relative_path), Some(&mut opts)) {
        Ok(blame) => blame,
        Err(e) if e.code() == ErrorCode::NotFound => {
            log.log_error(format!("- no blame results for file '{}'", file_name));
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let line_count: usize = blame.iter().map(|hunk| hunk.lines_in_hunk()).sum();

    let mut file_blame = FileBlame::new(file_name);
    for &line in lines {
        if line <= 0 {
            blame_whole_file(repo, head, relative_path, line, &mut file_blame, log)?;
            continue;
        }

        let entry = file_blame.line_mut(line);
        let Some(hunk) = blame
            .get_line(line as usize)
            .filter(|_| line as usize <= line_count)
        else {
            // stale request against a shorter file: keep the placeholders
            continue;
        };

        let location = format!("line {} in file {}", line, file_name);
        let commit = record_commit(
            entry,
            hunk.final_commit_id(),
            |id| repo.find_commit(id),
            &location,
            log,
        );

        let author = person(&hunk.final_signature())
            .or_else(|| commit.as_ref().and_then(|c| person(&c.committer())));
        match author {
            Some((name, email)) => {
                entry.name = name;
                entry.email = email;
            }
            None => log.log_error(format!("- no author information found for {}", location)),
        }
    }

    Ok(Some(file_blame))
}

/// Fill the commit id and time of `entry`.
///
/// The id comes straight from the blame hunk; `lookup` is only needed for the
/// commit time. Returns the commit when the lookup succeeded.
fn record_commit<'r>(
    entry: &mut LineBlame,
    commit_id: Oid,
    lookup: impl FnOnce(Oid) -> Result<Commit<'r>, git2::Error>,
    location: &str,
    log: &mut FilteredLog,
) -> Option<Commit<'r>> {
    if commit_id.is_zero() {
        log.log_error(format!("- no commit ID found for {}", location));
        return None;
    }

    entry.commit = commit_id.to_string();
    match lookup(commit_id) {
        Ok(commit) => {
            entry.time = commit.time().seconds();
            Some(commit)
        }
        Err(e) => {
            log.log_error(format!(
                "- no commit time found for {} (commit {}): {}",
                location, commit_id, e
            ));
            None
        }
    }
}

/// Attribute the whole file to the last commit that touched it.
fn blame_whole_file(
    repo: &Repository,
    head: Oid,
    relative_path: &str,
    line: i32,
    file_blame: &mut FileBlame,
    log: &mut FilteredLog,
) -> Result<(), git2::Error> {
    let Some(commit) = last_commit(repo, head, relative_path)? else {
        log.log_error(format!(
            "- no commit found for file '{}'",
            file_blame.file_name()
        ));
        file_blame.line_mut(line);
        return Ok(());
    };

    let (name, email) = commit_person(&commit).unwrap_or_else(|| {
        log.log_error(format!(
            "- no author information found for file '{}'",
            file_blame.file_name()
        ));
        (EMPTY.to_string(), EMPTY.to_string())
    });
    let entry = file_blame.line_mut(line);
    entry.name = name;
    entry.email = email;
    entry.commit = commit.id().to_string();
    entry.time = commit.time().seconds();
    Ok(())
}

/// Blame all requested locations at `revision`.
///
/// Failures are logged per file and never abort the pass. Cancellation is
/// checked between files; on cancellation the blames collected so far are
/// returned inside [`Interrupted`].
pub fn blame(
    handle: &RepositoryHandle,
    revision: &str,
    locations: &LocationSet,
    mut log: FilteredLog,
    token: &CancellationToken,
) -> Result<Blames, Interrupted<Blames>> {
    log.log_info(format!(
        "Invoking Git blamer to create author and commit information for {} affected files",
        locations.len()
    ));
    if locations.is_empty() {
        return Ok(Blames::with_log(log));
    }

    let head = match handle.resolve(revision) {
        Ok(head) => head,
        Err(e) => {
            log.log_exception(&e, "Can't determine head commit for blaming");
            return Ok(Blames::with_log(log));
        }
    };
    log.log_info(format!("Git commit ID = '{}'", head));
    log.log_info(format!("Git working tree = '{}'", handle.work_tree().display()));

    let repo = handle.repository();
    let mut results = Vec::new();
    let runner = BatchRunner::new(token, "Git blame");
    let outcome = runner.run(
        locations.iter(),
        &mut log,
        |(file, _)| {
            format!(
                "Computing blame information failed for file '{}' at revision {}",
                file, head
            )
        },
        |(file, lines), log| {
            let relative = handle.relativize(file);
            if let Some(file_blame) = blame_file(repo, head, file, &relative, lines, log)? {
                results.push(file_blame);
            }
            Ok::<_, git2::Error>(())
        },
    );

    log.log_info(format!(
        "-> blamed authors of issues in {} files",
        results.len()
    ));
    log.log_summary();

    let mut blames = Blames::with_log(log);
    for file_blame in results {
        blames.add(file_blame);
    }

    match outcome {
        BatchOutcome::Completed => Ok(blames),
        BatchOutcome::Interrupted { completed } => {
            Err(Interrupted::new(blames, completed, locations.len()))
        }
    }
}

/// Blamer bound to a working tree and revision.
#[derive(Debug, Clone)]
pub struct GitBlamer {
    work_tree: PathBuf,
    revision: String,
    max_logged_errors: usize,
}

impl GitBlamer {
    pub fn new(work_tree: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            work_tree: work_tree.into(),
            revision: revision.into(),
            max_logged_errors: crate::log::DEFAULT_MAX_LINES,
        }
    }

    pub fn with_max_logged_errors(mut self, max: usize) -> Self {
        self.max_logged_errors = max;
        self
    }

    /// Open the repository, blame `locations`, and close it again.
    pub fn blame(
        &self,
        locations: &LocationSet,
        token: &CancellationToken,
    ) -> Result<Blames, Interrupted<Blames>> {
        let log =
            FilteredLog::with_max_lines("Errors while running Git blame:", self.max_logged_errors);
        with_repository(
            &self.work_tree,
            log,
            |log| Ok(Blames::with_log(log)),
            |handle, log| blame(handle, &self.revision, locations, log, token),
        )
    }
}
