//! Error types for the copilot pipeline

use thiserror::Error;

/// Result type alias for copilot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while answering a delay question
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed query, rejected before any retrieval work
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding model or vector lookup could not be reached
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// Index and record store disagree with each other or with the embedder
    #[error("index corrupt: {0}")]
    IndexCorrupt(String),

    /// Language model call failed or returned nothing usable
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// An artifact file could not be read or decoded
    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },
}

impl Error {
    /// Short stable label for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid-input",
            Self::RetrievalUnavailable(_) => "retrieval-unavailable",
            Self::IndexCorrupt(_) => "index-corrupt",
            Self::GenerationUnavailable(_) => "generation-unavailable",
            Self::Load { .. } => "load",
        }
    }

    pub(crate) fn load(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::Load {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}
