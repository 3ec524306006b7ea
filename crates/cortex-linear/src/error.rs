//! Error types for cortex-linear.

/// Errors from drafting or creating Linear issues and projects.
#[derive(Debug, thiserror::Error)]
pub enum LinearError {
    /// No API key configured.
    #[error(
        "Linear API key is missing.\n\
         Add `api_key` under [linear] in cortex.toml.\n\
         Get your key at: https://linear.app/settings/api"
    )]
    MissingApiKey,

    /// No team id configured or passed.
    #[error(
        "Linear team ID is missing.\n\
         Add `team_id` under [linear] in cortex.toml or pass one explicitly.\n\
         Find your team ID via Linear's API or URL."
    )]
    MissingTeam,

    /// The model response did not contain a usable issue draft.
    #[error("could not generate issue data: {0}")]
    Draft(String),

    /// HTTP transport error talking to the Linear API.
    #[error("Linear request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Linear API returned GraphQL errors.
    #[error("Linear API error: {0}")]
    Api(String),

    /// The Linear API answered without the expected payload.
    #[error("unexpected Linear API response shape")]
    UnexpectedResponse,

    /// Model error while drafting.
    #[error(transparent)]
    Llm(#[from] cortex_llm::LlmError),
}

/// Result type alias using `LinearError`.
pub type Result<T> = std::result::Result<T, LinearError>;
