//! Linear issue tracker integration.
//!
//! Issues are drafted by the configured LLM from a free-text description,
//! then created through Linear's GraphQL API. Projects can likewise get an
//! AI-written description when none is given.

pub mod client;
pub mod draft;
pub mod error;

use cortex_core::{Config, LinearConfig};
use cortex_llm::LlmProvider;
use tracing::warn;

pub use client::{CreatedIssue, CreatedProject, LinearClient};
pub use draft::IssueDraft;
pub use error::{LinearError, Result};

/// Cached summary characters fed as context when drafting an issue.
const ISSUE_CONTEXT_CHARS: usize = 500;

/// Cached summary characters fed as context when describing a project.
const PROJECT_CONTEXT_CHARS: usize = 300;

const MAX_TITLE_CHARS: usize = 80;
const MAX_PROJECT_NAME_CHARS: usize = 255;
const DEFAULT_PRIORITY: u8 = 3;

/// Draft an issue with the model and create it in Linear.
///
/// `summary` is the cached project overview, used as drafting context.
/// `team_id` overrides the configured team for this call.
///
/// # Errors
///
/// Returns an error if credentials are missing, drafting fails, or the
/// Linear API rejects the mutation.
pub async fn create_issue<P: LlmProvider>(
    config: &Config,
    provider: &P,
    summary: Option<&str>,
    description: &str,
    team_id: Option<&str>,
) -> Result<String> {
    let linear = linear_config(config);
    let api_key = require_api_key(&linear)?;
    let team = team_id
        .map(str::to_owned)
        .or_else(|| linear.team_id.clone())
        .filter(|t| !t.is_empty())
        .ok_or(LinearError::MissingTeam)?;

    let context: String = summary
        .unwrap_or_default()
        .chars()
        .take(ISSUE_CONTEXT_CHARS)
        .collect();
    let raw = provider
        .generate(&draft::issue_prompt(description, &context))
        .await?;
    let drafted = draft::parse_issue_draft(&raw)?;

    let title = if drafted.title.is_empty() {
        description.chars().take(MAX_TITLE_CHARS).collect()
    } else {
        drafted.title
    };
    let body = if drafted.description.is_empty() {
        description.to_owned()
    } else {
        drafted.description
    };
    let priority = drafted.priority.unwrap_or(DEFAULT_PRIORITY);

    let client = LinearClient::new(&linear.api_url, api_key);
    let issue = client.create_issue(&title, &body, &team, priority).await?;

    let preview: String = body.chars().take(300).collect();
    let mut out = format!(
        "Linear issue created\n  id: {}\n  title: {}\n  link: {}\n",
        issue.identifier, issue.title, issue.url
    );
    if let Some(label) = drafted.label_name.filter(|l| !l.is_empty()) {
        out.push_str(&format!("  label: {label}\n"));
    }
    out.push_str(&format!("\nAI-generated description:\n{preview}..."));
    Ok(out)
}

/// Create a Linear project, drafting a description when none is given.
///
/// A drafting failure is logged and the project is created without a
/// description.
///
/// # Errors
///
/// Returns an error if the API key is missing or the Linear API rejects
/// the mutation.
pub async fn create_project<P: LlmProvider>(
    config: &Config,
    provider: &P,
    summary: Option<&str>,
    name: &str,
    description: Option<&str>,
    team_ids: Option<Vec<String>>,
) -> Result<String> {
    let linear = linear_config(config);
    let api_key = require_api_key(&linear)?;

    let teams: Vec<String> = team_ids.unwrap_or_else(|| {
        linear
            .team_id
            .clone()
            .filter(|t| !t.is_empty())
            .into_iter()
            .collect()
    });

    let description = match description {
        Some(d) => Some(d.to_owned()),
        None => {
            let context: String = summary
                .unwrap_or_default()
                .chars()
                .take(PROJECT_CONTEXT_CHARS)
                .collect();
            let prompt = draft::project_description_prompt(name, &context);
            match provider.generate(&prompt).await {
                Ok(text) => {
                    let text = text.trim().trim_matches('"').to_owned();
                    (!text.is_empty()).then_some(text)
                }
                Err(e) => {
                    warn!(error = %e, "project description drafting failed");
                    None
                }
            }
        }
    };

    let name: String = name.chars().take(MAX_PROJECT_NAME_CHARS).collect();
    let client = LinearClient::new(&linear.api_url, api_key);
    let project = client
        .create_project(&name, description.as_deref(), &teams)
        .await?;

    let mut out = format!(
        "Linear project created\n  name: {}\n  state: {}\n  link: {}",
        project.name, project.state, project.url
    );
    if let Some(desc) = project.description.filter(|d| !d.is_empty()) {
        let preview: String = desc.chars().take(200).collect();
        out.push_str(&format!("\n\nDescription: {preview}"));
    }
    Ok(out)
}

fn linear_config(config: &Config) -> LinearConfig {
    config.linear.clone().unwrap_or_default()
}

fn require_api_key(linear: &LinearConfig) -> Result<&str> {
    linear
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(LinearError::MissingApiKey)
}
