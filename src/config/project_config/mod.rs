//! Project-level configuration support
//!
//! Loads per-project configuration from `git-forensics.toml` or
//! `.git-forensics.json` in the repository root.
//!
//! # Configuration Format
//!
//! ```toml
//! # git-forensics.toml
//!
//! scm = "git"              # force the SCM kind instead of detecting it
//! max_logged_errors = 5    # error lines kept per log
//!
//! [blame]
//! revision = "HEAD"
//!
//! [mining]
//! revision = "HEAD"
//!
//! [reference]
//! branch = "main"
//! max_commits = 500        # omit for an unbounded search
//! ```

use crate::error::ForensicsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Revision used when none is configured
pub const DEFAULT_REVISION: &str = "HEAD";

/// Reference branch used when none is configured
pub const DEFAULT_REFERENCE_BRANCH: &str = "main";

/// File names probed in the repository root, in order
pub const PROJECT_CONFIG_FILES: &[&str] = &["git-forensics.toml", ".git-forensics.json"];

/// Configuration loaded from git-forensics.toml or similar
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForensicsConfig {
    /// SCM kind tag (auto-detected if not specified)
    #[serde(default)]
    pub scm: Option<String>,

    /// Number of error lines kept in each log
    #[serde(default)]
    pub max_logged_errors: Option<usize>,

    #[serde(default)]
    pub blame: BlameConfig,

    #[serde(default)]
    pub mining: MiningConfig,

    #[serde(default)]
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlameConfig {
    /// Revision to blame at
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MiningConfig {
    /// Revision whose history is mined
    #[serde(default)]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReferenceConfig {
    /// Reference branch name
    #[serde(default)]
    pub branch: Option<String>,

    /// Maximum number of commits inspected on the current branch
    #[serde(default)]
    pub max_commits: Option<usize>,
}

impl ForensicsConfig {
    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: ForensicsConfig) {
        if other.scm.is_some() {
            self.scm = other.scm;
        }
        if other.max_logged_errors.is_some() {
            self.max_logged_errors = other.max_logged_errors;
        }
        if other.blame.revision.is_some() {
            self.blame.revision = other.blame.revision;
        }
        if other.mining.revision.is_some() {
            self.mining.revision = other.mining.revision;
        }
        if other.reference.branch.is_some() {
            self.reference.branch = other.reference.branch;
        }
        if other.reference.max_commits.is_some() {
            self.reference.max_commits = other.reference.max_commits;
        }
    }

    pub fn max_logged_errors(&self) -> usize {
        self.max_logged_errors
            .unwrap_or(crate::log::DEFAULT_MAX_LINES)
    }

    pub fn blame_revision(&self) -> &str {
        self.blame.revision.as_deref().unwrap_or(DEFAULT_REVISION)
    }

    pub fn mining_revision(&self) -> &str {
        self.mining.revision.as_deref().unwrap_or(DEFAULT_REVISION)
    }

    pub fn reference_branch(&self) -> &str {
        self.reference
            .branch
            .as_deref()
            .unwrap_or(DEFAULT_REFERENCE_BRANCH)
    }

    pub fn reference_max_commits(&self) -> Option<usize> {
        self.reference.max_commits
    }
}

/// Load project configuration from the repository root.
///
/// Unreadable or malformed files are logged and skipped; without any file the
/// defaults are returned.
pub fn load_project_config(repo_path: &Path) -> ForensicsConfig {
    for name in PROJECT_CONFIG_FILES {
        let path = repo_path.join(name);
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded project config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ForensicsConfig::default()
}

/// Load a configuration file; the format is picked by extension (JSON or TOML).
pub fn load_config_file(path: &Path) -> Result<ForensicsConfig, ForensicsError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content).map_err(|e| ForensicsError::Config(e.to_string()))
    } else {
        toml::from_str(&content).map_err(|e| ForensicsError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests;
