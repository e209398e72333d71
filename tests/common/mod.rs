//! Shared fixtures for integration tests

#![allow(dead_code)]

use anyhow::Result;
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::path::Path;
use tempfile::TempDir;

/// Repository on `main` in a temp directory
pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl Fixture {
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

    /// Write and commit `file` as `author` at `time`
    pub fn commit(&self, file: &str, content: &str, author: &str, time: i64) -> Result<Oid> {
        let full_path = self.path().join(file);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)?;

        let mut index = self.repo.index()?;
        index.add_path(Path::new(file))?;
        index.write()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;

        let sig = Signature::new(
            author,
            &format!("{}@example.com", author.to_lowercase()),
            &Time::new(time, 0),
        )?;
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        let message = format!("Update {}", file);
        Ok(self
            .repo
            .commit(Some("HEAD"), &sig, &sig, &message, &tree, &parents)?)
    }

    /// Create `name` at HEAD and switch to it
    pub fn branch(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.branch(name, &head, false)?;
        self.switch(name)
    }

    /// Switch HEAD, index and working tree to an existing branch
    pub fn switch(&self, name: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", name);
        let target = self.repo.revparse_single(&refname)?;
        self.repo.checkout_tree(
            &target,
            Some(git2::build::CheckoutBuilder::new().force()),
        )?;
        self.repo.set_head(&refname)?;
        Ok(())
    }
}
