//! Tracked file enumeration

use crate::error::ForensicsResult;
use git2::{ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use std::collections::BTreeSet;

/// All file paths in the tree of `commit`, relative to the repository root.
///
/// Submodule entries are skipped; only blobs are listed.
pub fn list_files(repo: &Repository, commit: Oid) -> ForensicsResult<BTreeSet<String>> {
    let tree = repo.find_commit(commit)?.tree()?;

    let mut files = BTreeSet::new();
    tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            let name = entry.name().unwrap_or("");
            files.insert(format!("{}{}", dir, name));
        }
        TreeWalkResult::Ok
    })?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::TestRepo;
    use anyhow::Result;

    #[test]
    fn test_lists_nested_files() -> Result<()> {
        let repo = TestRepo::new()?;
        repo.commit_file("README.md", "readme\n", "Foo", 1_000, "readme")?;
        repo.commit_file("src/lib.rs", "lib\n", "Foo", 2_000, "lib")?;
        let head = repo.commit_file("src/git/mod.rs", "mod\n", "Foo", 3_000, "mod")?;

        let files = list_files(repo.repo(), head)?;
        let files: Vec<_> = files.iter().map(String::as_str).collect();
        assert_eq!(files, vec!["README.md", "src/git/mod.rs", "src/lib.rs"]);
        Ok(())
    }

    #[test]
    fn test_lists_files_at_older_commit() -> Result<()> {
        let repo = TestRepo::new()?;
        let first = repo.commit_file("a.txt", "a\n", "Foo", 1_000, "a")?;
        repo.commit_file("b.txt", "b\n", "Foo", 2_000, "b")?;
        repo.remove_file("a.txt", "Foo", 3_000)?;

        let files = list_files(repo.repo(), first)?;
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec!["a.txt"]);
        Ok(())
    }
}
