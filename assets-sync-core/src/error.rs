//! Errors that abort a whole import run.

use crate::contract::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Directory does not exist: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to list files: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to prepare target folder {path}: {source}")]
    TargetFolder { path: String, source: StoreError },
}
