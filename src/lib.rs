//! git-forensics - Git blame and repository mining
//!
//! Attributes source locations to the commits and authors that last touched
//! them, folds file histories into change statistics, and finds where the
//! current branch left a reference branch.

pub mod batch;
pub mod config;
pub mod error;
pub mod git;
pub mod log;
pub mod models;
pub mod reporters;
pub mod scm;

pub use batch::{CancellationToken, Interrupted};
pub use error::{ForensicsError, ForensicsResult};
pub use log::FilteredLog;
pub use models::{
    Blames, FileBlame, FileStatistics, LineBlame, LocationSet, ReferencePoint,
    RepositoryStatistics,
};
pub use scm::{Blamer, Miner, ScmContext, ScmRegistry};
