use crate::error::LlmError;

/// Abstraction over the generation/embedding model server.
///
/// Implementations are cheap to clone and hold no request state; every call
/// opens, uses, and releases its own connection.
pub trait LlmProvider: Send + Sync {
    /// Send a prompt to the generation model and return the full response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or the response is invalid.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Embed a piece of text into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or returns no vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn name(&self) -> &str;
}
