//! Artifact inspection commands

use crate::state::AppState;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use nomatch_core::{artifact_metadata, latest_csv_artifact, CSV_ARTIFACT_PREFIX};

/// Inspect stored CSV artifacts
#[derive(Subcommand, Debug)]
pub enum ArtifactsCommand {
    /// List all artifacts in the configured store
    List,
    /// Print an artifact's content
    Show(ShowArgs),
    /// Print the most recent training-phrase export
    Latest(LatestArgs),
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Artifact name
    pub name: String,

    /// Version to load (zero-based; latest when omitted)
    #[arg(short, long)]
    pub version: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct LatestArgs {
    /// Name substring to match
    #[arg(short, long, default_value = CSV_ARTIFACT_PREFIX)]
    pub pattern: String,
}

pub async fn list(state: &AppState) -> anyhow::Result<String> {
    let names = state.store.list().await?;

    if names.is_empty() {
        return Ok("No artifacts found.".to_string());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(Color::Green),
            Cell::new("Size").fg(Color::Green),
        ]);

    for name in &names {
        let size = artifact_metadata(state.store.as_ref(), name)
            .await
            .map(|info| info.size.to_string())
            .unwrap_or_else(|| "?".to_string());
        table.add_row(vec![name.clone(), size]);
    }

    Ok(format!("\n{}\n\nTotal: {} artifacts", table, names.len()))
}

pub async fn show(state: &AppState, args: ShowArgs) -> anyhow::Result<String> {
    let data = state.store.load(&args.name, args.version).await?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

pub async fn latest(state: &AppState, args: LatestArgs) -> anyhow::Result<String> {
    match latest_csv_artifact(state.store.as_ref(), &args.pattern).await {
        Some(artifact) => Ok(format!(
            "{}\n\n{}",
            artifact.filename,
            String::from_utf8_lossy(&artifact.data)
        )),
        None => Ok(format!("No CSV artifacts found matching: {}", args.pattern)),
    }
}
