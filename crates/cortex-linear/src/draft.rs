//! Prompts for AI-drafted issues and extraction of the drafted JSON.

use serde::Deserialize;

use crate::error::{LinearError, Result};

/// Issue fields drafted by the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default, rename = "labelName")]
    pub label_name: Option<String>,
}

/// Prompt asking the model to draft an issue as strict JSON.
#[must_use]
pub fn issue_prompt(description: &str, project_context: &str) -> String {
    format!(
        "You are a project manager. Create a Linear issue based on the following description.\n\
         Respond ONLY with valid JSON, nothing else.\n\
         \n\
         Project context: {project_context}\n\
         \n\
         Description: {description}\n\
         \n\
         Return JSON with these fields:\n\
         {{\n\
         \x20 \"title\": \"Short, clear title (max 80 characters)\",\n\
         \x20 \"description\": \"Detailed description with background, acceptance criteria and any technical details\",\n\
         \x20 \"priority\": 0-4 where 0=none, 1=urgent, 2=high, 3=medium, 4=low,\n\
         \x20 \"labelName\": \"Bug | Feature | Improvement | Documentation | Refactor\"\n\
         }}"
    )
}

/// Prompt asking the model for a short project description.
#[must_use]
pub fn project_description_prompt(name: &str, project_context: &str) -> String {
    format!(
        "Based on this project name, write a 1-2 sentence description for a Linear project.\n\
         Project context: {project_context}\n\
         Name: {name}\n\
         Respond with ONLY the description, no quotes or JSON."
    )
}

/// Extract the draft from a model response that may wrap the JSON in prose.
///
/// Takes the slice between the first `{` and the last `}`.
///
/// # Errors
///
/// Returns [`LinearError::Draft`] if no JSON object is present or it does
/// not parse.
pub fn parse_issue_draft(raw: &str) -> Result<IssueDraft> {
    let start = raw
        .find('{')
        .ok_or_else(|| LinearError::Draft("no JSON object in model response".to_owned()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| LinearError::Draft("no JSON object in model response".to_owned()))?;
    serde_json::from_str(&raw[start..=end]).map_err(|e| LinearError::Draft(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let draft = parse_issue_draft(
            r#"{"title": "Fix login", "description": "Details", "priority": 2, "labelName": "Bug"}"#,
        )
        .unwrap();
        assert_eq!(draft.title, "Fix login");
        assert_eq!(draft.priority, Some(2));
        assert_eq!(draft.label_name.as_deref(), Some("Bug"));
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = "Sure, here is the issue:\n{\"title\": \"T\", \"description\": \"D\"}\nHope it helps!";
        let draft = parse_issue_draft(raw).unwrap();
        assert_eq!(draft.title, "T");
        assert!(draft.priority.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let draft = parse_issue_draft("{}").unwrap();
        assert!(draft.title.is_empty());
        assert!(draft.description.is_empty());
    }

    #[test]
    fn response_without_json_is_a_draft_error() {
        let err = parse_issue_draft("I cannot do that.").unwrap_err();
        assert!(matches!(err, LinearError::Draft(_)));
    }

    #[test]
    fn malformed_json_is_a_draft_error() {
        let err = parse_issue_draft("{\"title\": }").unwrap_err();
        assert!(matches!(err, LinearError::Draft(_)));
    }

    #[test]
    fn prompts_embed_inputs() {
        let prompt = issue_prompt("fix the login bug", "a web shop");
        assert!(prompt.contains("fix the login bug"));
        assert!(prompt.contains("a web shop"));
        assert!(prompt.contains("labelName"));

        let prompt = project_description_prompt("Checkout v2", "a web shop");
        assert!(prompt.contains("Checkout v2"));
    }
}
