//! Reference point search
//!
//! Finds the latest commit the current branch shares with a reference
//! branch (usually `main`). The current branch is walked newest first and
//! each commit is checked against the full history of the reference branch.
//! The walk stops after a configurable number of commits.

use crate::error::{ForensicsError, ForensicsResult};
use crate::git::repository::RepositoryHandle;
use crate::log::FilteredLog;
use crate::models::ReferencePoint;
use git2::{BranchType, Oid, Repository, Sort};
use std::collections::HashSet;

/// Search settings for [`find_reference_point`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSearch {
    /// Name of the reference branch
    pub branch: String,
    /// Maximum number of current-branch commits inspected (None = unbounded)
    pub max_commits: Option<usize>,
}

impl ReferenceSearch {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            max_commits: None,
        }
    }

    pub fn with_max_commits(mut self, max_commits: usize) -> Self {
        self.max_commits = Some(max_commits);
        self
    }
}

/// Resolve a branch name: local branch first, then `origin/<name>`, then any revision.
fn resolve_branch(repo: &Repository, name: &str) -> ForensicsResult<Oid> {
    if let Ok(branch) = repo.find_branch(name, BranchType::Local) {
        return Ok(branch.get().peel_to_commit()?.id());
    }
    if let Ok(branch) = repo.find_branch(&format!("origin/{}", name), BranchType::Remote) {
        return Ok(branch.get().peel_to_commit()?.id());
    }
    repo.revparse_single(name)
        .and_then(|object| object.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|source| ForensicsError::UnresolvedRevision {
            revision: name.to_string(),
            source,
        })
}

/// Every commit reachable from `start`.
fn reachable_commits(repo: &Repository, start: Oid) -> ForensicsResult<HashSet<Oid>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push(start)?;
    let mut commits = HashSet::new();
    for oid in revwalk {
        commits.insert(oid?);
    }
    Ok(commits)
}

/// Search for the latest commit of HEAD that is also part of `search.branch`.
///
/// Returns `NotFound` when HEAD is the reference branch itself or when no
/// shared commit is seen within `search.max_commits` commits. Git failures
/// are returned as errors and also written to `log`.
pub fn find_reference_point(
    handle: &RepositoryHandle,
    search: &ReferenceSearch,
    log: &mut FilteredLog,
) -> ForensicsResult<ReferencePoint> {
    let result = search_reference_point(handle, search, log);
    if let Err(e) = &result {
        log.log_exception(
            e,
            format!("Searching for a reference point on '{}' failed", search.branch),
        );
    }
    result
}

fn search_reference_point(
    handle: &RepositoryHandle,
    search: &ReferenceSearch,
    log: &mut FilteredLog,
) -> ForensicsResult<ReferencePoint> {
    let repo = handle.repository();
    let current = handle.current_branch()?;
    if current == search.branch {
        log.log_info(format!(
            "Current branch '{}' is the reference branch, no reference point needed",
            current
        ));
        return Ok(ReferencePoint::NotFound);
    }

    let reference_head = resolve_branch(repo, &search.branch)?;
    let reference_commits = reachable_commits(repo, reference_head)?;

    let head = handle.resolve("HEAD")?;
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;
    revwalk.push(head)?;

    let limit = search.max_commits.unwrap_or(usize::MAX);
    let mut inspected = 0;
    for oid in revwalk.take(limit) {
        let oid = oid?;
        inspected += 1;
        if reference_commits.contains(&oid) {
            log.log_info(format!(
                "Found reference point {} on '{}' after {} commits",
                oid, search.branch, inspected
            ));
            return Ok(ReferencePoint::Found(oid.to_string()));
        }
    }

    log.log_info(format!(
        "No commit shared with '{}' within {} commits of '{}'",
        search.branch, inspected, current
    ));
    Ok(ReferencePoint::NotFound)
}
