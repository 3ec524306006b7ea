//! Error types for cortex-core.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal at startup; the display text carries the
/// remediation the user needs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist.
    #[error(
        "config not found: {path}\ncopy cortex.example.toml to {path} (or point --config / CORTEX_CONFIG at your config file)",
        path = .0.display()
    )]
    NotFound(PathBuf),

    /// IO error reading the config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or type error.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Required keys are absent or empty.
    #[error("config missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// Chunk overlap must be strictly smaller than chunk size.
    #[error("invalid indexing config: chunk_overlap ({overlap}) must be less than chunk_size ({size})")]
    InvalidChunking { size: usize, overlap: usize },
}

/// Result type alias using `ConfigError`.
pub type Result<T> = std::result::Result<T, ConfigError>;
