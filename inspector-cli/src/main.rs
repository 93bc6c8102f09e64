// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Inspector CLI - inspect, query and export Conga platform data.
//!
//! # Examples
//!
//! ```bash
//! # Classify a page URL
//! inspector classify https://rls-preview.congacloud.eu/clm/agreements/a1
//!
//! # Fetch the record shown by a page
//! inspector record view https://rls-preview.congacloud.eu/clm/agreements/a1
//!
//! # Browse data
//! inspector data Account --fields Id,Name --limit 10
//!
//! # Run an ad-hoc query and save it
//! inspector query run /Account -X POST --body '{"Name":"Acme"}' --save "create account"
//!
//! # JSON output
//! inspector --format json --pretty objects list
//!
//! # Watch network calls while requesting endpoints
//! inspector watch /objects /Account
//! ```

mod app;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    call, catalog, classify, config, data, objects, query, record, serve, stats, token, watch,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Inspector CLI - Conga platform data inspector.
#[derive(Parser)]
#[command(name = "inspector")]
#[command(about = "Inspect, query and export Conga platform data")]
#[command(long_about = r#"
Inspector talks to the Conga platform data API with client credentials.

The client secret is read from INSPECTOR_CLIENT_SECRET or the system
keychain (see `inspector config secret`). Connection details live in the
settings file (see `inspector config path`).

Examples:
  inspector classify <url>          # Object type and record id of a page
  inspector record view <url>       # Fetch the record shown by a page
  inspector objects list            # List platform objects
  inspector data Account            # Browse raw records
  inspector query run /objects      # Ad-hoc API call
  inspector watch /objects          # Show network events for calls
"#)]
#[command(version)]
#[command(author = "Inspector Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage the bearer token.
    #[command(visible_alias = "t")]
    Token(token::TokenArgs),

    /// Call the data API.
    Call(call::CallArgs),

    /// Classify page URLs into object type and record id.
    Classify(classify::ClassifyArgs),

    /// Run and manage explorer queries.
    #[command(visible_alias = "q")]
    Query(query::QueryArgs),

    /// Browse object metadata.
    #[command(visible_alias = "o")]
    Objects(objects::ObjectsArgs),

    /// Browse raw records of an object.
    #[command(visible_alias = "d")]
    Data(data::DataArgs),

    /// View or export the record shown by a page.
    #[command(visible_alias = "r")]
    Record(record::RecordArgs),

    /// List endpoints from the API's OpenAPI document.
    Catalog(catalog::CatalogArgs),

    /// Show network events while calling endpoints.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Answer JSON backend messages read from stdin, one per line.
    Serve,

    /// Show or reset usage statistics.
    Stats(stats::StatsArgs),

    /// Manage settings.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Authentication failed or no secret configured.
    AuthFailed = 2,
    /// The API rejected the request.
    ApiError = 3,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("inspector=debug,info")
    } else {
        EnvFilter::new("inspector=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Token(args) => token::run(args, &cli).await,
        Commands::Call(args) => call::run(args, &cli).await,
        Commands::Classify(args) => classify::run(args, &cli),
        Commands::Query(args) => query::run(args, &cli).await,
        Commands::Objects(args) => objects::run(args, &cli).await,
        Commands::Data(args) => data::run(args, &cli).await,
        Commands::Record(args) => record::run(args, &cli).await,
        Commands::Catalog(args) => catalog::run(args, &cli).await,
        Commands::Watch(args) => watch::run(args, &cli).await,
        Commands::Serve => serve::run().await,
        Commands::Stats(args) => stats::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

/// Maps a failure onto an exit code.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    use inspector_explorer::ExplorerError;
    use inspector_fetch::{ApiError, AuthError};

    if error.downcast_ref::<AuthError>().is_some() {
        return ExitCode::AuthFailed;
    }
    match error.downcast_ref::<ApiError>() {
        Some(e) if e.is_auth() => return ExitCode::AuthFailed,
        Some(_) => return ExitCode::ApiError,
        None => {}
    }
    match error.downcast_ref::<ExplorerError>() {
        Some(ExplorerError::Auth(_)) => ExitCode::AuthFailed,
        Some(ExplorerError::Api(e)) if e.is_auth() => ExitCode::AuthFailed,
        Some(ExplorerError::Api(_)) => ExitCode::ApiError,
        _ => ExitCode::Error,
    }
}
