//! Local Guide CLI - Database migrations and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! lg-cli migrate
//!
//! # Print the payment price catalog
//! lg-cli catalog
//!
//! # Show the moderation queue
//! lg-cli submissions list --status pending
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use localguide_core::SubmissionStatus;

mod commands;

#[derive(Parser)]
#[command(name = "lg-cli")]
#[command(author, version, about = "Local Guide CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print the server-side price catalog
    Catalog,
    /// Inspect directory submissions
    Submissions {
        #[command(subcommand)]
        action: SubmissionsAction,
    },
}

#[derive(Subcommand)]
enum SubmissionsAction {
    /// List submissions, newest first
    List {
        /// Only show this status (`pending`, `approved`, `denied`)
        #[arg(short, long)]
        status: Option<SubmissionStatus>,

        /// Maximum rows to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Catalog => commands::catalog::print(),
        Commands::Submissions { action } => match action {
            SubmissionsAction::List { status, limit } => {
                commands::submissions::list(status, limit).await?;
            }
        },
    }
    Ok(())
}
