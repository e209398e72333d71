//! SCM capability lookup
//!
//! Blamers and miners are created through an explicit registry keyed by an
//! SCM kind tag. The registry is populated at startup; paths without a
//! supported SCM get null implementations that only log.

use crate::batch::{CancellationToken, Interrupted};
use crate::git::{GitBlamer, GitMiner, RepositoryHandle};
use crate::log::FilteredLog;
use crate::models::{Blames, LocationSet, RepositoryStatistics};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag of the built-in Git support
pub const GIT: &str = "git";

/// Computes line attribution for a location set.
pub trait Blamer: Send + Sync {
    /// SCM kind tag this blamer belongs to
    fn name(&self) -> &'static str;

    fn blame(
        &self,
        locations: &LocationSet,
        token: &CancellationToken,
    ) -> Result<Blames, Interrupted<Blames>>;
}

/// Computes per-file history statistics. An empty file set means all files.
pub trait Miner: Send + Sync {
    /// SCM kind tag this miner belongs to
    fn name(&self) -> &'static str;

    fn mine(
        &self,
        files: &BTreeSet<String>,
        token: &CancellationToken,
    ) -> Result<RepositoryStatistics, Interrupted<RepositoryStatistics>>;
}

/// Everything a factory needs to bind a blamer or miner to a working tree.
#[derive(Debug, Clone)]
pub struct ScmContext {
    pub work_tree: PathBuf,
    pub revision: String,
    pub max_logged_errors: usize,
}

impl ScmContext {
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
}

pub type ScmProbe = fn(&Path) -> bool;
pub type BlamerFactory = fn(&ScmContext) -> Box<dyn Blamer>;
pub type MinerFactory = fn(&ScmContext) -> Box<dyn Miner>;

struct ScmEntry {
    tag: &'static str,
    probe: ScmProbe,
    blamer: BlamerFactory,
    miner: MinerFactory,
}

/// Mapping from SCM kind tag to blamer and miner constructors.
#[derive(Default)]
pub struct ScmRegistry {
    entries: Vec<ScmEntry>,
}

impl ScmRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all built-in SCM kinds
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(GIT, RepositoryHandle::is_git_repo, git_blamer, git_miner);
        registry
    }

    /// Register an SCM kind, replacing an earlier registration of the same tag.
    ///
    /// Detection probes run in registration order.
    pub fn register(
        &mut self,
        tag: &'static str,
        probe: ScmProbe,
        blamer: BlamerFactory,
        miner: MinerFactory,
    ) {
        debug!("Registering SCM: {}", tag);
        let entry = ScmEntry {
            tag,
            probe,
            blamer,
            miner,
        };
        match self.entries.iter_mut().find(|e| e.tag == tag) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.tag)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.tag == tag)
    }

    /// Tag of the first registered SCM that recognizes `path`
    pub fn detect(&self, path: &Path) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| (e.probe)(path))
            .map(|e| e.tag)
    }

    /// Create a blamer for `kind`, or for the detected SCM when `kind` is `None`.
    pub fn blamer(&self, kind: Option<&str>, context: &ScmContext) -> Box<dyn Blamer> {
        match self.lookup(kind, &context.work_tree) {
            Some(entry) => (entry.blamer)(context),
            None => Box::new(NullBlamer::new(describe(kind, &context.work_tree))),
        }
    }

    /// Create a miner for `kind`, or for the detected SCM when `kind` is `None`.
    pub fn miner(&self, kind: Option<&str>, context: &ScmContext) -> Box<dyn Miner> {
        match self.lookup(kind, &context.work_tree) {
            Some(entry) => (entry.miner)(context),
            None => Box::new(NullMiner::new(describe(kind, &context.work_tree))),
        }
    }

    fn lookup(&self, kind: Option<&str>, path: &Path) -> Option<&ScmEntry> {
        let tag = match kind {
            Some(tag) => tag,
            None => self.detect(path)?,
        };
        self.entries.iter().find(|e| e.tag == tag)
    }
}

fn describe(kind: Option<&str>, path: &Path) -> String {
    match kind {
        Some(tag) => format!("SCM is not supported: no '{}' support registered", tag),
        None => format!("SCM is not supported: no repository found at {}", path.display()),
    }
}

fn git_blamer(context: &ScmContext) -> Box<dyn Blamer> {
    Box::new(
        GitBlamer::new(&context.work_tree, &context.revision)
            .with_max_logged_errors(context.max_logged_errors),
    )
}

fn git_miner(context: &ScmContext) -> Box<dyn Miner> {
    Box::new(
        GitMiner::new(&context.work_tree, &context.revision)
            .with_max_logged_errors(context.max_logged_errors),
    )
}

impl Blamer for GitBlamer {
    fn name(&self) -> &'static str {
        GIT
    }

    fn blame(
        &self,
        locations: &LocationSet,
        token: &CancellationToken,
    ) -> Result<Blames, Interrupted<Blames>> {
        GitBlamer::blame(self, locations, token)
    }
}

impl Miner for GitMiner {
    fn name(&self) -> &'static str {
        GIT
    }

    fn mine(
        &self,
        files: &BTreeSet<String>,
        token: &CancellationToken,
    ) -> Result<RepositoryStatistics, Interrupted<RepositoryStatistics>> {
        GitMiner::mine(self, files, token)
    }
}

/// Blamer for unsupported working trees
#[derive(Debug, Clone)]
pub struct NullBlamer {
    reason: String,
}

impl NullBlamer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Blamer for NullBlamer {
    fn name(&self) -> &'static str {
        "none"
    }

    fn blame(
        &self,
        _locations: &LocationSet,
        _token: &CancellationToken,
    ) -> Result<Blames, Interrupted<Blames>> {
        let mut log = FilteredLog::new("Errors while blaming:");
        log.log_error(self.reason.clone());
        Ok(Blames::with_log(log))
    }
}

/// Miner for unsupported working trees
#[derive(Debug, Clone)]
pub struct NullMiner {
    reason: String,
}

impl NullMiner {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Miner for NullMiner {
    fn name(&self) -> &'static str {
        "none"
    }

    fn mine(
        &self,
        _files: &BTreeSet<String>,
        _token: &CancellationToken,
    ) -> Result<RepositoryStatistics, Interrupted<RepositoryStatistics>> {
        let mut log = FilteredLog::new("Errors while mining:");
        log.log_error(self.reason.clone());
        Ok(RepositoryStatistics::with_log(log))
    }
}
