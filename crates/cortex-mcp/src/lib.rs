//! MCP stdio server for cortex.

pub mod error;
pub mod server;

pub use error::{McpServeError, Result};
pub use server::{CortexServer, serve_stdio};
