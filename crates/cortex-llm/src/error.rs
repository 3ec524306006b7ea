//! Error types for cortex-llm.

/// Errors from the remote model server.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Connection failure, timeout, or non-success response.
    #[error("model server request failed: {0}")]
    Request(String),

    /// Response arrived but carried no usable payload.
    #[error("empty response from {provider}")]
    EmptyResponse { provider: &'static str },

    /// Generic catch-all error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using `LlmError`.
pub type Result<T> = std::result::Result<T, LlmError>;
