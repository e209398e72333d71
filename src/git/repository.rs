//! Scoped access to a git repository
//!
//! Each blame or mining invocation opens the repository once, works on it
//! through a [`RepositoryHandle`], and releases it when the handle is
//! dropped, whether the pass finished, failed or was cancelled.

use crate::error::{ForensicsError, ForensicsResult};
use crate::log::FilteredLog;
use git2::{Oid, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open repository bound to its working tree.
pub struct RepositoryHandle {
    repo: Repository,
    work_tree: PathBuf,
}

impl RepositoryHandle {
    /// Open the repository containing `path` (any subdirectory works).
    pub fn open(path: &Path) -> ForensicsResult<Self> {
        let repo = Repository::discover(path).map_err(|source| ForensicsError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let work_tree = repo.workdir().unwrap_or(repo.path()).to_path_buf();
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo, work_tree })
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Root of the checked-out working tree (the git dir for bare repositories).
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Resolve a revision string ("HEAD", a branch, a hash) to a commit id.
    pub fn resolve(&self, revision: &str) -> ForensicsResult<Oid> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|source| ForensicsError::UnresolvedRevision {
                revision: revision.to_string(),
                source,
            })
    }

    /// Short name of the checked-out branch, or "HEAD" when detached.
    pub fn current_branch(&self) -> ForensicsResult<String> {
        let head = self.repo.head()?;
        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }
        Ok("HEAD".to_string())
    }

    /// Convert a requested path into a path relative to the working tree.
    ///
    /// Absolute paths inside the working tree are stripped of the tree prefix;
    /// everything else is returned unchanged. Separators are normalized to `/`.
    pub fn relativize(&self, path: &str) -> String {
        let candidate = Path::new(path);
        if !candidate.is_absolute() {
            return path.replace('\\', "/");
        }
        let relative = candidate
            .strip_prefix(&self.work_tree)
            .map(Path::to_path_buf)
            .ok()
            .or_else(|| {
                let canonical = self.work_tree.canonicalize().ok()?;
                candidate.strip_prefix(canonical).map(Path::to_path_buf).ok()
            })
            .unwrap_or_else(|| candidate.to_path_buf());
        relative.to_string_lossy().replace('\\', "/")
    }
}

impl Drop for RepositoryHandle {
    fn drop(&mut self) {
        debug!("Closed git repository at {:?}", self.repo.path());
    }
}

/// Open the repository at `path` and run `work` against it.
///
/// If the repository cannot be opened, the failure is written to `log` and
/// `fallback` builds the result from it instead. The repository is closed on
/// every exit path.
pub fn with_repository<T>(
    path: &Path,
    mut log: FilteredLog,
    fallback: impl FnOnce(FilteredLog) -> T,
    work: impl FnOnce(&RepositoryHandle, FilteredLog) -> T,
) -> T {
    match RepositoryHandle::open(path) {
        Ok(handle) => work(&handle, log),
        Err(e) => {
            log.log_exception(&e, "Can't access the git repository");
            fallback(log)
        }
    }
}
