//! Per-file commit history
//!
//! [`FileLog`] walks the commits that touched a path, newest first, and
//! [`aggregate_file_history`] folds that walk into [`FileStatistics`].
//!
//! The fold relies on the walk order: the first commit folded in sets the
//! last-modification time and the last one sets the creation time. `FileLog`
//! pops commits by commit time, newest first, to guarantee that.

use crate::log::FilteredLog;
use crate::models::FileStatistics;
use git2::{Commit, DiffOptions, Oid, Repository, Tree};
use std::collections::{BinaryHeap, HashSet};
use std::path::{Path, PathBuf};

/// Commits reachable from a start commit that changed a given path.
///
/// History is simplified the way `git log -- <path>` does it: when a commit
/// has the same version of the path as one of its parents, the walk follows
/// only that parent and the commit is not reported. Otherwise every parent
/// is followed and the commit counts as a change (for a root commit: when
/// the path exists). Side branches whose changes a merge discarded are never
/// visited.
pub struct FileLog<'r> {
    repo: &'r Repository,
    queue: BinaryHeap<(i64, Oid)>,
    seen: HashSet<Oid>,
    path: PathBuf,
}

impl<'r> FileLog<'r> {
    pub fn new(repo: &'r Repository, start: Oid, path: &str) -> Result<Self, git2::Error> {
        let commit = repo.find_commit(start)?;
        let mut log = Self {
            repo,
            queue: BinaryHeap::new(),
            seen: HashSet::new(),
            path: PathBuf::from(path),
        };
        log.enqueue(&commit);
        Ok(log)
    }

    fn enqueue(&mut self, commit: &Commit<'_>) {
        if self.seen.insert(commit.id()) {
            self.queue.push((commit.time().seconds(), commit.id()));
        }
    }

    /// Queue the parents worth following and tell whether `commit` changed the path.
    fn visit(&mut self, commit: &Commit<'r>) -> Result<bool, git2::Error> {
        let current = entry_id(&commit.tree()?, &self.path);
        let parents: Vec<Commit<'r>> = commit.parents().collect();
        if parents.is_empty() {
            return Ok(current.is_some());
        }

        let mut same = None;
        for parent in &parents {
            if entry_id(&parent.tree()?, &self.path) == current {
                same = Some(parent);
                break;
            }
        }
        match same {
            Some(parent) => {
                self.enqueue(parent);
                Ok(false)
            }
            None => {
                for parent in &parents {
                    self.enqueue(parent);
                }
                Ok(true)
            }
        }
    }
}

impl<'r> Iterator for FileLog<'r> {
    type Item = Result<Commit<'r>, git2::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((_, oid)) = self.queue.pop() {
            let commit = match self.repo.find_commit(oid) {
                Ok(commit) => commit,
                Err(e) => return Some(Err(e)),
            };
            match self.visit(&commit) {
                Ok(true) => return Some(Ok(commit)),
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

fn entry_id(tree: &Tree<'_>, path: &Path) -> Option<Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

/// Most recent commit reachable from `start` that changed `path`.
pub fn last_commit<'r>(
    repo: &'r Repository,
    start: Oid,
    path: &str,
) -> Result<Option<Commit<'r>>, git2::Error> {
    FileLog::new(repo, start, path)?.next().transpose()
}

/// First non-blank value of email, then name.
pub(crate) fn identity(email: Option<&str>, name: Option<&str>) -> Option<String> {
    [email, name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(String::from)
}

/// Identity used to count distinct authors of a commit.
///
/// Author email, else author name, else committer email or name, else "".
pub fn author_identity(commit: &Commit<'_>) -> String {
    let author = commit.author();
    let committer = commit.committer();
    identity(author.email(), author.name())
        .or_else(|| identity(committer.email(), committer.name()))
        .unwrap_or_default()
}

/// Lines added and deleted in `path` by `commit`, compared with its first parent.
fn line_changes(
    repo: &Repository,
    commit: &Commit<'_>,
    path: &str,
) -> Result<(usize, usize), git2::Error> {
    let tree = commit.tree()?;
    let parent_tree = commit.parent(0).ok().map(|p| p.tree()).transpose()?;

    let mut opts = DiffOptions::new();
    opts.pathspec(path);
    opts.disable_pathspec_match(true);

    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
    let stats = diff.stats()?;
    Ok((stats.insertions(), stats.deletions()))
}

/// Transient state used while folding a file's history.
///
/// The author identity set only exists here; the finished
/// [`FileStatistics`] keeps the count.
#[derive(Debug)]
pub struct FileStatisticsBuilder {
    statistics: FileStatistics,
    authors: HashSet<String>,
}

impl FileStatisticsBuilder {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            statistics: FileStatistics::new(file_name),
            authors: HashSet::new(),
        }
    }

    /// Fold in one commit. Commits must arrive newest first.
    pub fn fold(&mut self, identity: String, time: i64, added: usize, deleted: usize) {
        self.authors.insert(identity);
        let stats = &mut self.statistics;
        stats.number_of_authors = self.authors.len();
        if stats.number_of_commits == 0 {
            stats.last_modification_time = time;
        }
        stats.creation_time = time;
        stats.number_of_commits += 1;
        stats.added_lines += added;
        stats.deleted_lines += deleted;
    }

    /// Statistics folded so far.
    pub fn statistics(&self) -> &FileStatistics {
        &self.statistics
    }

    pub fn build(self) -> FileStatistics {
        self.statistics
    }
}

/// Walk the history of `path` from `start` and summarize it.
///
/// A failing walk is logged and whatever was folded before the failure is
/// returned.
pub fn aggregate_file_history(
    repo: &Repository,
    start: Oid,
    path: &str,
    log: &mut FilteredLog,
) -> FileStatistics {
    let mut builder = FileStatisticsBuilder::new(path);
    if let Err(e) = fold_history(repo, start, path, &mut builder) {
        log.log_exception(&e, format!("Can't analyze history of file '{}'", path));
    }
    builder.build()
}

fn fold_history(
    repo: &Repository,
    start: Oid,
    path: &str,
    builder: &mut FileStatisticsBuilder,
) -> Result<(), git2::Error> {
    for commit in FileLog::new(repo, start, path)? {
        let commit = commit?;
        let (added, deleted) = line_changes(repo, &commit, path)?;
        builder.fold(
            author_identity(&commit),
            commit.time().seconds(),
            added,
            deleted,
        );
    }
    Ok(())
}
