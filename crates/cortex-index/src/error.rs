//! Error types for cortex-index.

use std::path::PathBuf;

/// Errors that can occur during indexing and retrieval.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// IO error reading source files or the database directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error while persisting.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted file exists but does not match the expected schema.
    #[error("persisted data corrupt in {file}: {source}")]
    Corrupt {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// Model server error (embedding or generation).
    #[error(transparent)]
    Llm(#[from] cortex_llm::LlmError),

    /// Search or ask invoked before anything was indexed.
    #[error("no index found. Run `cortex index` first")]
    EmptyIndex,

    /// The requested project root does not exist.
    #[error("path does not exist: {}", .0.display())]
    MissingRoot(PathBuf),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
