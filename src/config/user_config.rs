//! User-level configuration for git-forensics
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/git-forensics/config.toml
//!
//! Project configuration overrides user configuration, and command-line
//! flags override both.

use super::project_config::{load_config_file, load_project_config, ForensicsConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the reference branch
pub const REFERENCE_BRANCH_ENV: &str = "GIT_FORENSICS_REFERENCE_BRANCH";

/// Get the user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("git-forensics").join("config.toml"))
}

/// Load the user config, or defaults if there is none
pub fn load_user_config() -> ForensicsConfig {
    let Some(path) = user_config_path().filter(|p| p.exists()) else {
        return ForensicsConfig::default();
    };
    match load_config_file(&path) {
        Ok(config) => {
            debug!("Loaded user config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {}", path.display(), e);
            ForensicsConfig::default()
        }
    }
}

/// Load config from all sources, with priority:
/// 1. Environment variables (highest)
/// 2. Project config in the repository root
/// 3. User config (~/.config/git-forensics/config.toml)
pub fn load_config(repo_path: &Path) -> ForensicsConfig {
    let mut config = load_user_config();
    config.merge(load_project_config(repo_path));
    apply_env(&mut config);
    config
}

fn apply_env(config: &mut ForensicsConfig) {
    if let Ok(branch) = std::env::var(REFERENCE_BRANCH_ENV) {
        if !branch.trim().is_empty() {
            config.reference.branch = Some(branch);
        }
    }
}
