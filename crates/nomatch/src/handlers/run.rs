//! Workflow run command

use crate::state::AppState;
use clap::Parser;
use nomatch_core::{SaveOutcome, WorkflowState};
use nomatch_workflow::{EventSink, Orchestrator, WorkflowPhase};
use std::path::PathBuf;
use tracing::{info, warn};

/// Run the no-match analysis workflow
///
/// Usage:
///   nomatch run --query "no-match events from last week"
///   nomatch run --query "last month" --bot-config exported_bot.json
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// What to analyze; drives the retrieval date window
    #[arg(short, long)]
    pub query: String,

    /// Exported bot configuration file; enables the structure-parsing step
    #[arg(long)]
    pub bot_config: Option<PathBuf>,
}

pub async fn run(state: &AppState, args: RunArgs) -> anyhow::Result<String> {
    let bot_config_document = match &args.bot_config {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read bot config {}: {}", path.display(), e))?,
        None => String::new(),
    };

    info!(
        "Starting workflow run (bot config: {})",
        if args.bot_config.is_some() { "provided" } else { "none" }
    );

    let mut workflow_state = WorkflowState::initialize(&state.config, state.executor.as_ref()).await;
    workflow_state.pending_query = args.query;
    workflow_state.bot_config_document = bot_config_document;

    let (sink, mut events) = EventSink::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("[{}] {}", event.step, event.message);
        }
    });

    let orchestrator =
        Orchestrator::with_services(state.executor.clone(), state.store.clone(), sink);
    let phase = orchestrator.run(&mut workflow_state).await?;
    drop(orchestrator);
    printer.await.ok();

    match phase {
        WorkflowPhase::Done => {
            let outcome: SaveOutcome = serde_json::from_str(&workflow_state.artifact_result)?;
            info!("Workflow run finished: {}", outcome.filename);
            Ok(format!(
                "✓ Workflow completed\n  Artifact: {}\n  Size: {} bytes\n  Saved at: {}",
                outcome.filename, outcome.size, outcome.saved_at
            ))
        }
        phase => {
            warn!("Workflow run stopped early at phase: {}", phase);
            Ok(format!(
                "Workflow stopped early (phase: {}). See warnings above for the failing step.",
                phase
            ))
        }
    }
}
