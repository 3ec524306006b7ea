//! Thin GraphQL client for the Linear API.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{LinearError, Result};

const ISSUE_CREATE: &str = "\
mutation CreateIssue($title: String!, $description: String, $teamId: String!, $priority: Int) {
  issueCreate(input: {
    title: $title
    description: $description
    teamId: $teamId
    priority: $priority
  }) {
    success
    issue {
      id
      identifier
      title
      url
    }
  }
}";

const PROJECT_CREATE: &str = "\
mutation ProjectCreate($name: String!, $description: String, $teamIds: [String!]) {
  projectCreate(input: {
    name: $name
    description: $description
    teamIds: $teamIds
  }) {
    success
    project {
      id
      name
      description
      url
      state
    }
  }
}";

/// A created issue as returned by `issueCreate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub identifier: String,
    pub title: String,
    pub url: String,
}

/// A created project as returned by `projectCreate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedProject {
    pub name: String,
    pub url: String,
    pub state: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Authenticated client against one GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct LinearClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl LinearClient {
    #[must_use]
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    /// Create an issue in `team_id`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, GraphQL errors, or an
    /// unexpected response shape.
    pub async fn create_issue(
        &self,
        title: &str,
        description: &str,
        team_id: &str,
        priority: u8,
    ) -> Result<CreatedIssue> {
        let variables = json!({
            "title": title,
            "description": description,
            "teamId": team_id,
            "priority": priority,
        });
        let data = self.request(ISSUE_CREATE, variables).await?;
        let issue = data
            .pointer("/issueCreate/issue")
            .cloned()
            .ok_or(LinearError::UnexpectedResponse)?;
        serde_json::from_value(issue).map_err(|_| LinearError::UnexpectedResponse)
    }

    /// Create a project, optionally attached to teams.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, GraphQL errors, or an
    /// unexpected response shape.
    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        team_ids: &[String],
    ) -> Result<CreatedProject> {
        let variables = json!({
            "name": name,
            "description": description,
            "teamIds": if team_ids.is_empty() { Value::Null } else { json!(team_ids) },
        });
        let data = self.request(PROJECT_CREATE, variables).await?;
        let project = data
            .pointer("/projectCreate/project")
            .cloned()
            .ok_or(LinearError::UnexpectedResponse)?;
        serde_json::from_value(project).map_err(|_| LinearError::UnexpectedResponse)
    }

    async fn request(&self, query: &str, variables: Value) -> Result<Value> {
        debug!(url = %self.api_url, "Linear GraphQL request");
        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let body: Value = response.json().await?;
        if let Some(errors) = body.get("errors") {
            return Err(LinearError::Api(errors.to_string()));
        }
        body.get("data")
            .cloned()
            .ok_or(LinearError::UnexpectedResponse)
    }
}
