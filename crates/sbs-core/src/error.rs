//! Error types for the diff view core

use thiserror::Error;

/// Failure to load a diff or comment payload
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A region object that is neither common nor a change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("region has neither `ab` nor `a`/`b` lines")]
    Empty,
    #[error("region mixes `ab` with `a`/`b` lines")]
    Mixed,
}

/// Syntax mode could not be loaded for a pane
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    #[error("no syntax mode for content type `{0}`")]
    Unknown(String),
    #[error("syntax mode failed to load: {0}")]
    Load(String),
}
