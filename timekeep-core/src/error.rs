use std::io;

use thiserror::Error;

use crate::project::ProjectId;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("no project with id {0}")]
    UnknownProject(ProjectId),

    #[error("project name must not be empty")]
    EmptyName,
}

/// Failure of the persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed project data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
