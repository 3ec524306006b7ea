//! Error types for cortex-mcp.

/// Errors surfaced by MCP tool execution or the stdio transport.
#[derive(Debug, thiserror::Error)]
pub enum McpServeError {
    #[error(transparent)]
    Index(#[from] cortex_index::IndexError),

    #[error(transparent)]
    Linear(#[from] cortex_linear::LinearError),

    /// Transport-level failure of the stdio session.
    #[error("MCP transport error: {0}")]
    Transport(String),
}

/// Result type alias using `McpServeError`.
pub type Result<T> = std::result::Result<T, McpServeError>;
