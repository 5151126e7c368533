//! Campus - command-line client for the Campus learning-management API
//!
//! Main entry point for the Campus CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod notify;

use campus_config::Environment;
use commands::{auth, request, resource};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Campus - command-line client for the Campus learning-management API
#[derive(Parser)]
#[command(name = "campus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API environment (production, dev, local, local-production)
    #[arg(long = "env", global = true, env = "CAMPUS_ENV")]
    pub environment: Option<Environment>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, sign out and inspect the stored session
    Auth(auth::AuthArgs),

    /// Send a raw request through the authenticated client
    Request(request::RequestArgs),

    /// CRUD operations on an API resource (Course, Lesson, Quiz, ...)
    Resource(resource::ResourceArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file.
    // Client failures reach the user as notifications, so the console layer
    // stays quiet about them unless --verbose is set.
    let filter = if cli.verbose {
        "campus=debug,campus_client=debug,campus_config=debug,info"
    } else {
        "campus=info,error"
    };

    let log_dir = campus_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "campus.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "campus=trace,campus_client=trace,campus_config=trace,info",
                )),
        )
        .init();

    let mut settings = campus_config::load_settings(None)?;
    if let Some(environment) = cli.environment {
        settings.environment = environment;
    }

    // Create context for commands
    let ctx = commands::Context {
        settings,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Request(args) => request::run(args, &ctx).await,
        Commands::Resource(args) => resource::run(args, &ctx).await,
    };

    // API failures were already shown as notifications
    if let Err(e) = &result
        && e
            .downcast_ref::<campus_client::Error>()
            .is_some_and(already_notified)
    {
        drop(guard);
        std::process::exit(1);
    }
    result
}

/// Whether the client surfaced this error through the notifier.
fn already_notified(error: &campus_client::Error) -> bool {
    use campus_client::Error;
    !matches!(
        error,
        Error::Config(_) | Error::InvalidUrl(_) | Error::Envelope(_)
    )
}
