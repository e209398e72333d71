//! Configuration module for git-forensics
//!
//! This module handles:
//! - Project-level configuration (git-forensics.toml)
//! - User-level configuration (~/.config/git-forensics/config.toml)
//! - Revision, reference branch and log size defaults

mod project_config;
mod user_config;

pub use project_config::{
    load_config_file, load_project_config, BlameConfig, ForensicsConfig, MiningConfig,
    ReferenceConfig, DEFAULT_REFERENCE_BRANCH, DEFAULT_REVISION, PROJECT_CONFIG_FILES,
};
pub use user_config::{load_config, load_user_config, user_config_path, REFERENCE_BRANCH_ENV};
