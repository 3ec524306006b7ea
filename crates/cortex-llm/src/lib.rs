//! Model-server boundary: text generation and embeddings over Ollama.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use error::{LlmError, Result};
#[cfg(feature = "mock")]
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use provider::LlmProvider;
