//! Repository mining: change statistics for a set of files

use crate::batch::{BatchOutcome, BatchRunner, CancellationToken, Interrupted};
use crate::git::files::list_files;
use crate::git::history::aggregate_file_history;
use crate::git::repository::{with_repository, RepositoryHandle};
use crate::log::FilteredLog;
use crate::models::RepositoryStatistics;
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::path::PathBuf;

/// Collect statistics for `files` at `revision`, or for every file when `files` is empty.
///
/// An unresolvable revision ends the run with empty statistics and a logged
/// error. Per-file failures are logged and the file keeps whatever partial
/// statistics were gathered. Cancellation is checked between files.
pub fn mine(
    handle: &RepositoryHandle,
    revision: &str,
    files: &BTreeSet<String>,
    mut log: FilteredLog,
    token: &CancellationToken,
) -> Result<RepositoryStatistics, Interrupted<RepositoryStatistics>> {
    log.log_info(format!(
        "Analyzing the commit log of the Git repository '{}'",
        handle.work_tree().display()
    ));

    let head = match handle.resolve(revision) {
        Ok(head) => head,
        Err(e) => {
            log.log_exception(&e, "Can't obtain HEAD of repository");
            return Ok(RepositoryStatistics::with_log(log));
        }
    };
    let repo = handle.repository();

    let files: BTreeSet<String> = if files.is_empty() {
        list_files(repo, head).unwrap_or_else(|e| {
            log.log_exception(&e, "Can't list the files of the repository, nothing to scan");
            BTreeSet::new()
        })
    } else {
        files.iter().map(|f| handle.relativize(f)).collect()
    };

    let mut results = Vec::with_capacity(files.len());
    let runner = BatchRunner::new(token, "Git mining");
    let outcome = runner.run(
        files.iter(),
        &mut log,
        |file| format!("Can't analyze history of file '{}'", file),
        |file, log| {
            results.push(aggregate_file_history(repo, head, file, log));
            Ok::<_, Infallible>(())
        },
    );

    log.log_info(format!("-> {} files analyzed", results.len()));
    log.log_summary();

    let mut statistics = RepositoryStatistics::with_log(log);
    statistics.add_all(results);

    match outcome {
        BatchOutcome::Completed => Ok(statistics),
        BatchOutcome::Interrupted { completed } => {
            Err(Interrupted::new(statistics, completed, files.len()))
        }
    }
}

/// Miner bound to a working tree and revision.
#[derive(Debug, Clone)]
pub struct GitMiner {
    work_tree: PathBuf,
    revision: String,
    max_logged_errors: usize,
}

impl GitMiner {
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

    /// Open the repository, mine `files`, and close it again.
    pub fn mine(
        &self,
        files: &BTreeSet<String>,
        token: &CancellationToken,
    ) -> Result<RepositoryStatistics, Interrupted<RepositoryStatistics>> {
        let log = FilteredLog::with_max_lines(
            "Errors while mining the Git repository:",
            self.max_logged_errors,
        );
        with_repository(
            &self.work_tree,
            log,
            |log| Ok(RepositoryStatistics::with_log(log)),
            |handle, log| mine(handle, &self.revision, files, log, token),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::TestRepo;
    use anyhow::Result;

    fn fixture() -> Result<TestRepo> {
        let repo = TestRepo::new()?;
        repo.commit_file("file.txt", "a\n", "Foo", 1_000, "first")?;
        repo.commit_file("file.txt", "a\nb\n", "Bar", 2_000, "second")?;
        repo.commit_file("src/other.rs", "fn main() {}\n", "Baz", 2_500, "other")?;
        repo.commit_file("file.txt", "a\nb\nc\n", "Foo", 3_000, "third")?;
        Ok(repo)
    }

    #[test]
    fn test_mine_all_files() -> Result<()> {
        let repo = fixture()?;
        let handle = RepositoryHandle::open(repo.path())?;
        let stats = mine(
            &handle,
            "HEAD",
            &BTreeSet::new(),
            FilteredLog::default(),
            &CancellationToken::new(),
        )?;

        assert_eq!(stats.len(), 2);
        let file = stats.get("file.txt").expect("file.txt mined");
        assert_eq!(file.number_of_commits, 3);
        assert_eq!(file.number_of_authors, 2);
        assert_eq!(file.creation_time, 1_000);
        assert_eq!(file.last_modification_time, 3_000);

        let other = stats.get("src/other.rs").expect("src/other.rs mined");
        assert_eq!(other.number_of_commits, 1);
        assert_eq!(other.number_of_authors, 1);
        assert_eq!(stats.total_commits(), 4);
        assert!(stats
            .log()
            .info_messages()
            .iter()
            .any(|m| m.contains("2 files analyzed")));
        Ok(())
    }

    #[test]
    fn test_mine_selected_files() -> Result<()> {
        let repo = fixture()?;
        let handle = RepositoryHandle::open(repo.path())?;
        let files: BTreeSet<String> = ["src/other.rs".to_string()].into();
        let stats = mine(
            &handle,
            "HEAD",
            &files,
            FilteredLog::default(),
            &CancellationToken::new(),
        )?;

        assert_eq!(stats.len(), 1);
        assert!(stats.contains("src/other.rs"));
        Ok(())
    }

    #[test]
    fn test_mine_at_older_revision() -> Result<()> {
        let repo = TestRepo::new()?;
        let first = repo.commit_file("a.txt", "a\n", "Foo", 1_000, "first")?;
        repo.commit_file("a.txt", "b\n", "Bar", 2_000, "second")?;
        let handle = RepositoryHandle::open(repo.path())?;

        let stats = mine(
            &handle,
            &first.to_string(),
            &BTreeSet::new(),
            FilteredLog::default(),
            &CancellationToken::new(),
        )?;
        let file = stats.get("a.txt").expect("a.txt mined");
        assert_eq!(file.number_of_commits, 1);
        assert_eq!(file.last_modification_time, 1_000);
        Ok(())
    }

    #[test]
    fn test_unresolvable_head_returns_empty() -> Result<()> {
        let repo = TestRepo::new()?;
        let handle = RepositoryHandle::open(repo.path())?;
        let stats = mine(
            &handle,
            "HEAD",
            &BTreeSet::new(),
            FilteredLog::default(),
            &CancellationToken::new(),
        )?;

        assert!(stats.is_empty());
        assert_eq!(stats.log().size(), 1);
        Ok(())
    }

    #[test]
    fn test_cancelled_mining_returns_partial() -> Result<()> {
        let repo = fixture()?;
        let handle = RepositoryHandle::open(repo.path())?;
        let token = CancellationToken::new();
        token.cancel();

        let interrupted = mine(
            &handle,
            "HEAD",
            &BTreeSet::new(),
            FilteredLog::default(),
            &token,
        )
        .expect_err("cancelled");
        assert_eq!(interrupted.total(), 2);
        assert!(interrupted.partial().is_empty());
        Ok(())
    }

    #[test]
    fn test_git_miner_without_repository() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let stats =
            GitMiner::new(dir.path(), "HEAD").mine(&BTreeSet::new(), &CancellationToken::new())?;
        assert!(stats.is_empty());
        assert!(stats.log().has_errors());
        Ok(())
    }
}
