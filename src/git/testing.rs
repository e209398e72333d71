//! Throwaway repositories for unit tests

use anyhow::Result;
use git2::{build::CheckoutBuilder, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A repository in a temp directory with `main` as its initial branch.
pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts)?;
        Ok(Self { dir, repo })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Write `content` to `file` and commit it as `author` at `time`.
    pub fn commit_file(
        &self,
        file: &str,
        content: &str,
        author: &str,
        time: i64,
        message: &str,
    ) -> Result<Oid> {
        let sig = signature(author, time)?;
        self.commit_file_as(file, content, &sig, &sig, message)
    }

    /// Like [`commit_file`](Self::commit_file) with distinct author and committer.
    pub fn commit_file_as(
        &self,
        file: &str,
        content: &str,
        author: &Signature<'_>,
        committer: &Signature<'_>,
        message: &str,
    ) -> Result<Oid> {
        let full_path = self.dir.path().join(file);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;

        let mut index = self.repo.index()?;
        index.add_path(Path::new(file))?;
        index.write()?;
        self.commit_index(author, committer, message)
    }

    /// Delete `file` and commit the removal.
    pub fn remove_file(&self, file: &str, author: &str, time: i64) -> Result<Oid> {
        fs::remove_file(self.dir.path().join(file))?;
        let mut index = self.repo.index()?;
        index.remove_path(Path::new(file))?;
        index.write()?;
        let sig = signature(author, time)?;
        self.commit_index(&sig, &sig, &format!("Remove {}", file))
    }

    /// Create a branch at HEAD and check it out.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;
        self.checkout(name)
    }

    /// Check out an existing local branch.
    pub fn checkout(&self, name: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", name);
        let target = self.repo.revparse_single(&refname)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().force()))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }

    fn commit_index(
        &self,
        author: &Signature<'_>,
        committer: &Signature<'_>,
        message: &str,
    ) -> Result<Oid> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(_) => None,
        };
        let parents: Vec<_> = parent.iter().collect();
        Ok(self
            .repo
            .commit(Some("HEAD"), author, committer, message, &tree, &parents)?)
    }
}

/// Signature for `name` with a derived email, at `time` seconds since the epoch.
pub fn signature(name: &str, time: i64) -> Result<Signature<'static>> {
    let email = format!("{}@example.com", name.to_lowercase());
    Ok(Signature::new(name, &email, &Time::new(time, 0))?)
}
