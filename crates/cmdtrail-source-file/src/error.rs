//! Error types for the file-backed sources.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceFileError {
    #[error("failed to parse {path}: {detail}")]
    Parse { path: String, detail: String },

    #[error("source io error: {0}")]
    Io(#[from] std::io::Error),
}
