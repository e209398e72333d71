//! Git blame and repository mining
//!
//! Thin orchestration over libgit2 (via the git2 crate):
//!
//! - Enumerate the tracked files of a commit
//! - Blame requested lines at a fixed revision
//! - Fold a file's history into change statistics
//! - Find the latest commit shared with a reference branch
//!
//! # Example
//!
//! ```no_run
//! use git_forensics::batch::CancellationToken;
//! use git_forensics::git::GitBlamer;
//! use git_forensics::models::LocationSet;
//!
//! let mut locations = LocationSet::new();
//! locations.add_line("src/main.rs", 42);
//!
//! let blames = GitBlamer::new(".", "HEAD")
//!     .blame(&locations, &CancellationToken::new())
//!     .unwrap_or_else(|interrupted| interrupted.into_partial());
//! println!("{} files blamed", blames.len());
//! ```

pub mod blame;
pub mod files;
pub mod history;
pub mod miner;
pub mod reference;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

pub use blame::GitBlamer;
pub use files::list_files;
pub use history::{aggregate_file_history, FileLog, FileStatisticsBuilder};
pub use miner::GitMiner;
pub use reference::{find_reference_point, ReferenceSearch};
pub use repository::{with_repository, RepositoryHandle};
