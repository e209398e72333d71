//! Error types shared by the blame and mining engines

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to a repository
#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Failed to open git repository at {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Could not resolve revision '{revision}': {source}")]
    UnresolvedRevision {
        revision: String,
        #[source]
        source: git2::Error,
    },

    #[error("Git API error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type ForensicsResult<T> = Result<T, ForensicsError>;
