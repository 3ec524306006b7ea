//! cortex: local RAG assistant for a codebase, backed by Ollama.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cortex_core::Config;
use cortex_index::{RagPipeline, format_search_results};
use cortex_llm::OllamaProvider;
use cortex_mcp::CortexServer;

#[derive(Parser)]
#[command(
    name = "cortex",
    about = "Local RAG assistant for your codebase, backed by Ollama"
)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: cortex.toml, or $CORTEX_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index or update the project in the flat-file database
    Index {
        /// Project path (defaults to the configured project_path)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Re-embed every file even if unchanged
        #[arg(short, long)]
        force: bool,
    },

    /// Semantic search over the indexed code
    Search {
        /// What you are looking for (function, class, concept)
        query: String,

        /// Number of results
        #[arg(short, long, default_value_t = 5)]
        n: usize,
    },

    /// Ask a question about the codebase
    Ask {
        /// Your question
        question: String,
    },

    /// Print the cached project summary
    Summary,

    /// Create an AI-drafted Linear issue from a description
    Issue {
        /// What the issue is about
        description: String,

        /// Linear team ID (defaults to the configured team)
        #[arg(long)]
        team: Option<String>,
    },

    /// Create a Linear project
    Project {
        /// Project name
        name: String,

        /// Project description (AI-generated from the name if omitted)
        #[arg(short, long)]
        description: Option<String>,

        /// Team ID to associate (repeatable)
        #[arg(long = "team")]
        teams: Vec<String>,
    },

    /// Serve the MCP protocol over stdin/stdout
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Arc::new(Config::load(&config_path)?);

    let provider = OllamaProvider::new(
        &config.ollama_url,
        config.llm_model.clone(),
        config.embed_model.clone(),
    );
    if let Err(e) = provider.health_check().await {
        tracing::warn!("{e}");
    }

    let mut pipeline = RagPipeline::new(config.clone(), provider)?;

    match cli.command {
        Commands::Index { path, force } => {
            let report = pipeline.index(path.as_deref(), force).await?;
            println!("{report}");
        }
        Commands::Search { query, n } => {
            let hits = pipeline.search(&query, n).await?;
            println!("{}", format_search_results(&query, &hits));
        }
        Commands::Ask { question } => {
            println!("{}", pipeline.ask(&question).await?);
        }
        Commands::Summary => {
            println!("{}", pipeline.summary()?);
        }
        Commands::Issue { description, team } => {
            let summary = pipeline.cached_summary()?;
            let out = cortex_linear::create_issue(
                &config,
                pipeline.provider(),
                summary.as_deref(),
                &description,
                team.as_deref(),
            )
            .await?;
            println!("{out}");
        }
        Commands::Project {
            name,
            description,
            teams,
        } => {
            let summary = pipeline.cached_summary()?;
            let out = cortex_linear::create_project(
                &config,
                pipeline.provider(),
                summary.as_deref(),
                &name,
                description.as_deref(),
                (!teams.is_empty()).then_some(teams),
            )
            .await?;
            println!("{out}");
        }
        Commands::Serve => {
            tracing::info!("starting MCP stdio server");
            let server = CortexServer::new(config.clone(), pipeline);
            cortex_mcp::serve_stdio(server).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so MCP stdio traffic on stdout stays clean.
fn init_tracing(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_defaults_to_five_results() {
        let cli = Cli::try_parse_from(["cortex", "search", "login handler"]).unwrap();
        let Commands::Search { query, n } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(query, "login handler");
        assert_eq!(n, 5);
    }

    #[test]
    fn index_accepts_force_and_path() {
        let cli = Cli::try_parse_from(["cortex", "index", "--force", "--path", "/tmp/p"]).unwrap();
        let Commands::Index { path, force } = cli.command else {
            panic!("expected index command");
        };
        assert!(force);
        assert_eq!(path, Some(PathBuf::from("/tmp/p")));
    }

    #[test]
    fn project_collects_repeated_teams() {
        let cli =
            Cli::try_parse_from(["cortex", "project", "Checkout", "--team", "a", "--team", "b"])
                .unwrap();
        let Commands::Project { teams, .. } = cli.command else {
            panic!("expected project command");
        };
        assert_eq!(teams, vec!["a", "b"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cortex", "-q", "-v", "summary"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["cortex", "summary", "--config", "/etc/cortex.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/cortex.toml")));
    }
}
