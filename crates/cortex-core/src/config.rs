//! TOML configuration with environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Top-level configuration, one instance per process.
///
/// Constructed once at startup and passed by reference into the pipeline;
/// nothing reads configuration ambiently after load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Root of the codebase to index.
    #[serde(default)]
    pub project_path: PathBuf,
    /// Directory holding the flat-file database (index.json, chunks.json, summary.json).
    #[serde(default)]
    pub database_path: PathBuf,
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Generation model name.
    #[serde(default)]
    pub llm_model: String,
    /// Embedding model name.
    #[serde(default)]
    pub embed_model: String,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear: Option<LinearConfig>,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

/// Chunking parameters and directory ignore list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Window size in lines.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Lines shared between consecutive windows.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Directory names to skip while scanning. `None` uses the built-in set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_dirs: Option<Vec<String>>,
}

fn default_chunk_size() -> usize {
    60
}

fn default_chunk_overlap() -> usize {
    10
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            ignore_dirs: None,
        }
    }
}

/// Linear issue-tracker credentials.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LinearConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    /// GraphQL endpoint; only overridden in tests.
    #[serde(default = "default_linear_api_url")]
    pub api_url: String,
}

fn default_linear_api_url() -> String {
    "https://api.linear.app/graphql".into()
}

impl Config {
    /// Load configuration from a TOML file, apply `CORTEX_*` env overrides,
    /// and validate required keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, unparsable, or
    /// if required keys are absent after overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// Path to the config file: `$CORTEX_CONFIG` if set, else `cortex.toml`
    /// in the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var("CORTEX_CONFIG")
            .map_or_else(|_| PathBuf::from("cortex.toml"), PathBuf::from)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CORTEX_PROJECT_PATH") {
            self.project_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CORTEX_DATABASE_PATH") {
            self.database_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CORTEX_OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Ok(v) = std::env::var("CORTEX_LLM_MODEL") {
            self.llm_model = v;
        }
        if let Ok(v) = std::env::var("CORTEX_EMBED_MODEL") {
            self.embed_model = v;
        }
        if let Ok(v) = std::env::var("CORTEX_CHUNK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.indexing.chunk_size = size;
            } else {
                tracing::warn!("ignoring invalid CORTEX_CHUNK_SIZE value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CORTEX_CHUNK_OVERLAP") {
            if let Ok(overlap) = v.parse::<usize>() {
                self.indexing.chunk_overlap = overlap;
            } else {
                tracing::warn!("ignoring invalid CORTEX_CHUNK_OVERLAP value: {v}");
            }
        }
        if let Ok(v) = std::env::var("CORTEX_LINEAR_API_KEY") {
            self.linear.get_or_insert_with(LinearConfig::default).api_key = Some(v);
        }
        if let Ok(v) = std::env::var("CORTEX_LINEAR_TEAM_ID") {
            self.linear.get_or_insert_with(LinearConfig::default).team_id = Some(v);
        }
    }

    fn expand_paths(&mut self) {
        self.project_path = expand_tilde(&self.project_path);
        self.database_path = expand_tilde(&self.database_path);
    }

    fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.project_path.as_os_str().is_empty() {
            missing.push("project_path".to_owned());
        }
        if self.database_path.as_os_str().is_empty() {
            missing.push("database_path".to_owned());
        }
        if self.ollama_url.is_empty() {
            missing.push("ollama_url".to_owned());
        }
        if self.llm_model.is_empty() {
            missing.push("llm_model".to_owned());
        }
        if self.embed_model.is_empty() {
            missing.push("embed_model".to_owned());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }
        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: self.indexing.chunk_size,
                overlap: self.indexing.chunk_overlap,
            });
        }
        Ok(())
    }
}

/// Expand a leading `~` or `~/` using `$HOME`.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if s == "~" {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home);
        }
    } else if let Some(rest) = s.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return Path::new(&home).join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serial_test::serial;

    use super::*;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("cortex.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    const VALID: &str = r#"
project_path = "/tmp/project"
database_path = "/tmp/db"
ollama_url = "http://localhost:11434"
llm_model = "deepseek-coder-v2"
embed_model = "nomic-embed-text"
"#;

    #[test]
    #[serial]
    fn load_missing_file_reports_remediation() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nonexistent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("config not found"));
        assert!(err.to_string().contains("cortex.example.toml"));
    }

    #[test]
    #[serial]
    fn load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), VALID);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.project_path, PathBuf::from("/tmp/project"));
        assert_eq!(config.llm_model, "deepseek-coder-v2");
        assert_eq!(config.indexing.chunk_size, 60);
        assert_eq!(config.indexing.chunk_overlap, 10);
        assert!(config.linear.is_none());
    }

    #[test]
    #[serial]
    fn missing_keys_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "project_path = \"/tmp/p\"\n");
        let err = Config::load(&path).unwrap_err();
        let ConfigError::MissingKeys(keys) = err else {
            panic!("expected MissingKeys, got {err}");
        };
        assert!(keys.contains(&"database_path".to_owned()));
        assert!(keys.contains(&"llm_model".to_owned()));
        assert!(keys.contains(&"embed_model".to_owned()));
        assert!(!keys.contains(&"ollama_url".to_owned()));
    }

    #[test]
    #[serial]
    fn env_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), VALID);
        // SAFETY: test is #[serial]; no other thread touches the environment.
        unsafe { std::env::set_var("CORTEX_PROJECT_PATH", "/env/override") };
        let config = Config::load(&path).unwrap();
        unsafe { std::env::remove_var("CORTEX_PROJECT_PATH") };
        assert_eq!(config.project_path, PathBuf::from("/env/override"));
    }

    #[test]
    #[serial]
    fn invalid_env_chunk_size_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), VALID);
        unsafe { std::env::set_var("CORTEX_CHUNK_SIZE", "not-a-number") };
        let config = Config::load(&path).unwrap();
        unsafe { std::env::remove_var("CORTEX_CHUNK_SIZE") };
        assert_eq!(config.indexing.chunk_size, 60);
    }

    #[test]
    #[serial]
    fn overlap_must_be_smaller_than_size() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{VALID}\n[indexing]\nchunk_size = 10\nchunk_overlap = 10\n");
        let path = write_config(dir.path(), &body);
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidChunking {
                size: 10,
                overlap: 10
            }
        ));
    }

    #[test]
    #[serial]
    fn tilde_expansion_uses_home() {
        let dir = tempfile::tempdir().unwrap();
        let body = VALID.replace("/tmp/project", "~/code/project");
        let path = write_config(dir.path(), &body);
        unsafe { std::env::set_var("HOME", "/home/tester") };
        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.project_path,
            PathBuf::from("/home/tester/code/project")
        );
    }

    #[test]
    #[serial]
    fn linear_section_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("{VALID}\n[linear]\napi_key = \"lin_abc\"\nteam_id = \"team-1\"\n");
        let path = write_config(dir.path(), &body);
        let config = Config::load(&path).unwrap();
        let linear = config.linear.unwrap();
        assert_eq!(linear.api_key.as_deref(), Some("lin_abc"));
        assert_eq!(linear.team_id.as_deref(), Some("team-1"));
        assert_eq!(linear.api_url, "https://api.linear.app/graphql");
    }

    #[test]
    #[serial]
    fn default_path_honors_env() {
        unsafe { std::env::set_var("CORTEX_CONFIG", "/etc/cortex/custom.toml") };
        let path = Config::default_path();
        unsafe { std::env::remove_var("CORTEX_CONFIG") };
        assert_eq!(path, PathBuf::from("/etc/cortex/custom.toml"));
        assert_eq!(Config::default_path(), PathBuf::from("cortex.toml"));
    }
}
