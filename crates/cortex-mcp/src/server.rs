//! MCP stdio server exposing the pipeline and Linear integration as tools.
//!
//! Speaks the standard MCP JSON-RPC protocol over stdin/stdout so editors
//! and assistants can index, search, and ask about the configured project.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use cortex_core::Config;
use cortex_index::{DEFAULT_SEARCH_RESULTS, RagPipeline, format_search_results};
use cortex_llm::LlmProvider;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorCode, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::{ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{McpServeError, Result};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AskArgs {
    /// Your question about the project
    pub question: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct IndexArgs {
    /// Absolute path to the project (leave empty to use the configured path)
    #[serde(default)]
    pub project_path: Option<String>,
    /// Force re-indexing even if an index already exists
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// What you are looking for (function, class, concept)
    pub query: String,
    /// Number of results to return (default: 5)
    #[serde(default)]
    pub n_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct SummaryArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueArgs {
    /// Describe what the issue is about
    pub description: String,
    /// Linear team ID (optional, uses default from config)
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateProjectArgs {
    /// Project name
    pub name: String,
    /// Project description (optional; AI-generated from name if omitted)
    #[serde(default)]
    pub description: Option<String>,
    /// Team IDs to associate (optional, uses default from config)
    #[serde(default)]
    pub team_ids: Option<Vec<String>>,
}

/// The MCP server. Each session shares one pipeline behind a mutex, so
/// indexing runs serialize against searches.
#[derive(Clone)]
pub struct CortexServer<P: LlmProvider> {
    config: Arc<Config>,
    pipeline: Arc<tokio::sync::Mutex<RagPipeline<P>>>,
}

impl<P: LlmProvider> CortexServer<P> {
    #[must_use]
    pub fn new(config: Arc<Config>, pipeline: RagPipeline<P>) -> Self {
        Self {
            config,
            pipeline: Arc::new(tokio::sync::Mutex::new(pipeline)),
        }
    }

    /// The tool descriptors advertised to clients.
    #[must_use]
    pub fn tools() -> Vec<Tool> {
        vec![
            tool::<AskArgs>(
                "ask_project",
                "Ask a question about the codebase. Uses RAG to find relevant code and \
                 answer with full context awareness.",
            ),
            tool::<IndexArgs>(
                "index_project",
                "Index or update the project codebase in the vector database.",
            ),
            tool::<SearchArgs>(
                "search_code",
                "Search for specific code, functions or patterns in the project.",
            ),
            tool::<SummaryArgs>(
                "get_project_summary",
                "Get a high-level summary of the project's architecture and structure.",
            ),
            tool::<CreateIssueArgs>(
                "create_linear_issue",
                "Create a Linear issue based on a description. AI drafts the title, \
                 description and priority automatically.",
            ),
            tool::<CreateProjectArgs>(
                "create_linear_project",
                "Create a Linear project. Optionally uses AI to generate a description \
                 from the project name and codebase context.",
            ),
        ]
    }

    /// # Errors
    ///
    /// Returns an error if retrieval or generation fails.
    pub async fn ask(&self, args: AskArgs) -> Result<String> {
        Ok(self.pipeline.lock().await.ask(&args.question).await?)
    }

    /// # Errors
    ///
    /// Returns an error if the indexing run fails.
    pub async fn index(&self, args: IndexArgs) -> Result<String> {
        let root = args
            .project_path
            .filter(|p| !p.is_empty())
            .map(|p| cortex_core::expand_tilde(Path::new(&p)));
        let report = self
            .pipeline
            .lock()
            .await
            .index(root.as_deref(), args.force)
            .await?;
        Ok(report.to_string())
    }

    /// # Errors
    ///
    /// Returns an error if the search fails or nothing is indexed.
    pub async fn search(&self, args: SearchArgs) -> Result<String> {
        let n = args.n_results.unwrap_or(DEFAULT_SEARCH_RESULTS);
        let hits = self.pipeline.lock().await.search(&args.query, n).await?;
        Ok(format_search_results(&args.query, &hits))
    }

    /// # Errors
    ///
    /// Returns an error if the summary file is corrupt.
    pub async fn summary(&self) -> Result<String> {
        Ok(self.pipeline.lock().await.summary()?)
    }

    /// # Errors
    ///
    /// Returns an error if credentials are missing or the Linear call fails.
    pub async fn linear_issue(&self, args: CreateIssueArgs) -> Result<String> {
        let pipeline = self.pipeline.lock().await;
        let summary = pipeline.cached_summary()?;
        Ok(cortex_linear::create_issue(
            &self.config,
            pipeline.provider(),
            summary.as_deref(),
            &args.description,
            args.team_id.as_deref(),
        )
        .await?)
    }

    /// # Errors
    ///
    /// Returns an error if credentials are missing or the Linear call fails.
    pub async fn linear_project(&self, args: CreateProjectArgs) -> Result<String> {
        let pipeline = self.pipeline.lock().await;
        let summary = pipeline.cached_summary()?;
        Ok(cortex_linear::create_project(
            &self.config,
            pipeline.provider(),
            summary.as_deref(),
            &args.name,
            args.description.as_deref(),
            args.team_ids,
        )
        .await?)
    }
}

impl<P: LlmProvider + 'static> ServerHandler for CortexServer<P> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cortex".to_string(),
                title: Some("Cortex".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Cortex is a local RAG assistant for one codebase. Run index_project \
                 first, then use ask_project for questions, search_code for snippet \
                 lookup, and get_project_summary for an overview. Linear tools create \
                 issues and projects drafted by the local model."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = std::result::Result<ListToolsResult, McpError>> + Send + '_
    {
        std::future::ready(Ok(ListToolsResult::with_all_items(Self::tools())))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        Self::tools().into_iter().find(|t| t.name == name)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let args = serde_json::Value::Object(request.arguments.unwrap_or_default());
        info!(tool = %request.name, "tool call");

        let outcome = match request.name.as_ref() {
            "ask_project" => self.ask(parse_args(args)?).await,
            "index_project" => self.index(parse_args(args)?).await,
            "search_code" => self.search(parse_args(args)?).await,
            "get_project_summary" => self.summary().await,
            "create_linear_issue" => self.linear_issue(parse_args(args)?).await,
            "create_linear_project" => self.linear_project(parse_args(args)?).await,
            other => {
                return Err(McpError::new(
                    ErrorCode::METHOD_NOT_FOUND,
                    format!("no tool registered with name: {other}"),
                    None,
                ));
            }
        };

        match outcome {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

/// Serve the MCP protocol over stdin/stdout until the client disconnects.
///
/// # Errors
///
/// Returns an error if the session fails to start or terminates abnormally.
pub async fn serve_stdio<P: LlmProvider + Clone + 'static>(server: CortexServer<P>) -> Result<()> {
    use rmcp::ServiceExt;

    let service = server
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await
        .map_err(|e| McpServeError::Transport(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| McpServeError::Transport(e.to_string()))?;
    Ok(())
}

fn tool<T: JsonSchema>(name: &str, description: &str) -> Tool {
    let schema = schemars::schema_for!(T);
    let input_schema = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    };
    Tool {
        name: Cow::Owned(name.to_owned()),
        title: None,
        description: Some(Cow::Owned(description.to_owned())),
        input_schema,
        output_schema: None,
        annotations: None,
        execution: None,
        icons: None,
        meta: None,
    }
}

fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> std::result::Result<T, McpError> {
    serde_json::from_value(args).map_err(|e| {
        McpError::new(
            ErrorCode::INVALID_PARAMS,
            format!("invalid arguments: {e}"),
            None,
        )
    })
}
