//! nomatch CLI - No-Match Analysis Workflow
//!
//! A command-line tool that retrieves chatbot conversations with
//! unrecognized-intent events, analyzes them, and exports suggested training
//! phrases as CSV artifacts.

mod handlers;
mod state;

use clap::{Parser, Subcommand};
use handlers::{artifacts, run};
use state::AppState;

#[derive(Parser)]
#[command(name = "nomatch", version, about = "No-match analysis and bot optimization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the analysis workflow
    Run(run::RunArgs),
    /// Inspect stored CSV artifacts
    #[command(subcommand)]
    Artifacts(artifacts::ArtifactsCommand),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize application state
    let state = match AppState::new() {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to initialize nomatch: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Run(args) => run::run(&state, args).await,
        Command::Artifacts(cmd) => match cmd {
            artifacts::ArtifactsCommand::List => artifacts::list(&state).await,
            artifacts::ArtifactsCommand::Show(args) => artifacts::show(&state, args).await,
            artifacts::ArtifactsCommand::Latest(args) => artifacts::latest(&state, args).await,
        },
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
