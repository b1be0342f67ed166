//! notesai: command-line front end for the NotesAI note store and AI
//! dispatch engine.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use notesai_core::AppConfig;

#[derive(Parser)]
#[command(name = "notesai")]
#[command(author, version, about = "Local notes with AI correction, summaries and categories")]
#[command(propagate_version = true)]
struct Cli {
    /// Data directory (overrides NOTESAI_HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new note and print its id
    New {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// List notes, most recently modified first
    List {
        /// Print the notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one note
    Show { id: String },

    /// Change a note's title, content or category
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a note
    Delete { id: String },

    /// Case-insensitive search over title, content and category
    Search { query: String },

    /// Run an AI operation (correction, resume, categorie) on a note
    Process {
        id: String,

        operation: String,

        /// Provider for this request, keeping its configured model
        #[arg(short, long)]
        provider: Option<String>,

        /// Model for this request, optionally provider-qualified
        /// (e.g. `openai:gpt-4o`, `ollama:llama2`)
        #[arg(short, long)]
        model: Option<String>,

        /// Write the result back: correction replaces the content,
        /// categorie sets the category
        #[arg(long)]
        apply: bool,
    },

    /// Show the active provider and model (set NOTESAI_PROVIDER to change it)
    Model,

    /// List suggested models per provider
    Models,

    /// Store the API key for a cloud provider
    SetKey { provider: String, api_key: String },

    /// Show or change prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptAction>,
    },
}

#[derive(Subcommand)]
enum PromptAction {
    /// Print every template
    Show,

    /// Replace the template of one operation
    Set { operation: String, template: String },

    /// Restore the built-in templates
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let _log_guard = init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(home) = cli.home {
        config = config.with_data_dir(home);
    }
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    commands::run(cli.command, &config).await
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
///   RUST_LOG    - standard env filter (default: "notesai=info")
///
/// Console output goes to stderr so command output stays pipeable.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notesai=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notesai.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}
