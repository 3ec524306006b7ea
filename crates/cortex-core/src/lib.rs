//! Configuration loading for cortex.
//!
//! A single TOML file describes the project to index, where the flat-file
//! database lives, and which Ollama models to use. Values can be overridden
//! through `CORTEX_*` environment variables.

pub mod config;
pub mod error;

pub use config::{Config, IndexingConfig, LinearConfig, expand_tilde};
pub use error::{ConfigError, Result};
