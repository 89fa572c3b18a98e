//! nlqe CLI - terminal client for the NLP Query Engine

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use nlqe::config::{self, NlqeConfig};
use nlqe::{HttpTransport, Orchestrator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nlqe")]
#[command(version)]
#[command(about = "Terminal client for the NLP Query Engine")]
#[command(long_about = r#"
nlqe talks to an NLP Query Engine backend:
  • Discover the schema of a database from its connection string
  • Upload documents for indexing and check their processing status
  • Ask questions in plain language and see tables and document hits

Example usage:
  nlqe connect --demo
  nlqe upload resumes/ann.pdf resumes/bob.pdf
  nlqe query "Show me all Python developers in Engineering"
  nlqe shell
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides NLQE_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format for one-shot commands
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputMode,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Discover the schema of a data source
    Connect {
        /// Connection string, passed to the backend verbatim
        #[arg(long = "conn")]
        connection_string: Option<String>,

        /// Use the demo SQLite database
        #[arg(long, conflicts_with = "connection_string")]
        demo: bool,
    },

    /// Upload documents for indexing
    Upload {
        /// Files to upload
        files: Vec<PathBuf>,
    },

    /// Check the processing status of an ingestion job
    Status {
        /// Job id returned by `upload`
        #[arg(short, long)]
        job: String,
    },

    /// Run a natural-language query
    Query {
        /// The question, e.g. "How many employees are in Engineering?"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List recent queries recorded by the backend
    History,

    /// Check that the backend is up
    Health,

    /// Write a config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Text)
    }
}

/// Print a machine-readable envelope for one-shot commands
pub fn emit(output_mode: OutputMode, command: &str, ok: bool, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode.is_human() {
        return Ok(());
    }
    let envelope = serde_json::json!({
        "ok": ok,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stderr keeps rendered output clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let file_config = config::load_config(Some(config_path.as_path()))?.unwrap_or_default();
    let base_url = file_config.resolve_base_url(
        cli.base_url.as_deref(),
        config::base_url_from_env().as_deref(),
    );

    if let Some(Commands::Init { force }) = &cli.command {
        let config = NlqeConfig {
            base_url: Some(base_url),
            connection_string: file_config.connection_string.clone(),
        };
        return commands::run_init(cli.format, &config_path, &config, *force);
    }

    tracing::debug!("Using backend at {}", base_url);
    let transport = Arc::new(HttpTransport::new(&base_url)?);
    let mut orch = Orchestrator::new(transport);

    let ok = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            nlqe::shell::run_shell(&mut orch).await?;
            true
        }
        Commands::Connect { connection_string, demo } => {
            let connection_string = if demo {
                nlqe::model::DEMO_CONNECTION.to_string()
            } else {
                connection_string
                    .or(file_config.connection_string)
                    .unwrap_or_default()
            };
            commands::run_connect(&mut orch, cli.format, connection_string).await?
        }
        Commands::Upload { files } => commands::run_upload(&mut orch, cli.format, files).await?,
        Commands::Status { job } => commands::run_status(&mut orch, cli.format, job).await?,
        Commands::Query { text } => commands::run_query(&mut orch, cli.format, text.join(" ")).await?,
        Commands::History => commands::run_history(&mut orch, cli.format).await?,
        Commands::Health => commands::run_health(&mut orch, cli.format).await?,
        Commands::Init { .. } => true,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
