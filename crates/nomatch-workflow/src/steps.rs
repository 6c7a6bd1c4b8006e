//! The four workflow steps
//!
//! Every LLM-backed step catches its own agent error, logs it, and leaves its
//! designated state field empty. Emptiness is the only failure signal the
//! orchestrator recognizes; a step never aborts the run directly.

use crate::agents::{
    BotStructureAgent, DateWindowAgent, NoMatchAnalysisAgent, TrainingPhraseAgent,
    TrainingPhraseRow,
};
use crate::events::EventSink;
use crate::prompts;
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use llm_toolkit::Agent;
use nomatch_core::{
    no_match_query, render_records, save_csv_artifact, ArtifactStore, DateWindow, QueryExecutor,
    Record, SaveStatus, WorkflowState,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Column order of the generated CSV artifact
pub const TRAINING_PHRASE_COLUMNS: [&str; 5] = [
    "Intent Name",
    "Training Phrase",
    "Priority",
    "Category",
    "Description",
];

/// A workflow step: consume state, emit progress events, write one field
#[async_trait]
pub trait WorkflowStep: Send + Sync {
    /// Step name used in events and logs
    fn name(&self) -> &'static str;

    /// Execute the step against the shared state
    async fn run(&self, state: &mut WorkflowState, events: &EventSink) -> Result<()>;
}

// ============================================================================
// Step 1: Conversation Data Retrieval
// ============================================================================

/// Retrieves conversation transcripts with no-match events from the warehouse
pub struct RetrievalStep {
    executor: Arc<dyn QueryExecutor>,
}

impl RetrievalStep {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    async fn resolve_window(&self, state: &WorkflowState, events: &EventSink) -> DateWindow {
        if state.pending_query.is_empty() {
            return DateWindow::default();
        }

        let prompt = prompts::date_window_prompt(&state.pending_query, &state.schema_metadata);
        let agent = DateWindowAgent::default();

        match agent.execute(prompt.into()).await {
            Ok(response) => match validated_window(
                &response.start_date,
                &response.end_date,
                response.explicit,
            ) {
                Some(window) => {
                    events.emit(
                        self.name(),
                        format!("Resolved date window: {} to {}", window.start, window.end),
                    );
                    window
                }
                None => {
                    debug!("No explicit date range; using the default window");
                    DateWindow::default()
                }
            },
            Err(e) => {
                warn!("Date window resolution failed: {:?}; using default", e);
                DateWindow::default()
            }
        }
    }
}

/// Convert agent-resolved dates into a usable window
///
/// Returns `None` when the range is implicit or the dates do not parse or
/// are inverted; callers fall back to the default window.
pub fn validated_window(start_date: &str, end_date: &str, explicit: bool) -> Option<DateWindow> {
    if !explicit {
        return None;
    }
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").ok()?;
    let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d").ok()?;
    if start > end {
        return None;
    }
    Some(DateWindow { start, end })
}

#[async_trait]
impl WorkflowStep for RetrievalStep {
    fn name(&self) -> &'static str {
        "conversation_data_retrieval"
    }

    async fn run(&self, state: &mut WorkflowState, events: &EventSink) -> Result<()> {
        let window = self.resolve_window(state, events).await;
        let sql = no_match_query(&state.project_id, &state.dataset_name, window);

        match self.executor.execute(&state.project_id, &sql).await {
            Ok(rows) if rows.is_empty() => {
                warn!("Query returned no conversations with no-match events");
                events.emit(self.name(), "No conversations with no-match events found");
            }
            Ok(rows) => {
                info!("Retrieved {} conversations with no-match events", rows.len());
                events.emit(
                    self.name(),
                    format!("Retrieved {} conversations", rows.len()),
                );
                state.retrieval_result = render_records(&rows);
            }
            Err(e) => {
                // An empty result field is the failure signal; do not raise
                warn!("Conversation data retrieval failed: {}", e);
                events.emit(self.name(), format!("Retrieval failed: {}", e));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Step 2: No-Match Analysis
// ============================================================================

/// Analyzes retrieved transcripts and produces the patterns report
#[derive(Default)]
pub struct AnalysisStep;

#[async_trait]
impl WorkflowStep for AnalysisStep {
    fn name(&self) -> &'static str {
        "no_match_analysis"
    }

    async fn run(&self, state: &mut WorkflowState, events: &EventSink) -> Result<()> {
        events.emit(self.name(), "Analyzing no-match patterns");

        let prompt = prompts::analysis_prompt(&state.retrieval_result);
        let agent = NoMatchAnalysisAgent::default();

        match agent.execute(prompt.into()).await {
            Ok(response) => {
                info!(
                    "Analysis found {} patterns and {} intent gaps",
                    response.patterns.len(),
                    response.intent_gaps.len()
                );
                events.emit(
                    self.name(),
                    format!(
                        "Found {} patterns, {} intent gaps",
                        response.patterns.len(),
                        response.intent_gaps.len()
                    ),
                );
                state.analysis_result = render_analysis_report(
                    &response.summary,
                    &response.patterns,
                    &response.intent_gaps,
                    &response.priority_actions,
                );
            }
            Err(e) => {
                warn!("No-match analysis failed: {:?}", e);
                events.emit(self.name(), format!("Analysis failed: {}", e));
            }
        }

        Ok(())
    }
}

/// Render the analysis response as the report text stored in state
pub fn render_analysis_report(
    summary: &str,
    patterns: &[String],
    intent_gaps: &[String],
    priority_actions: &[String],
) -> String {
    let mut report = String::new();
    report.push_str("# No-Match Analysis Report\n\n## Summary\n");
    report.push_str(summary);

    report.push_str("\n\n## Patterns\n");
    for pattern in patterns {
        report.push_str(&format!("- {}\n", pattern));
    }

    report.push_str("\n## Intent Gaps\n");
    for gap in intent_gaps {
        report.push_str(&format!("- {}\n", gap));
    }

    report.push_str("\n## Prioritized Actions\n");
    for (i, action) in priority_actions.iter().enumerate() {
        report.push_str(&format!("{}. {}\n", i + 1, action));
    }

    report
}

// ============================================================================
// Step 3: Bot Structure Parsing (conditional)
// ============================================================================

/// Parses the caller-supplied bot configuration document
///
/// The orchestrator only runs this step when `bot_config_document` is
/// non-empty; the step itself assumes the document is present.
#[derive(Default)]
pub struct StructureParsingStep;

#[async_trait]
impl WorkflowStep for StructureParsingStep {
    fn name(&self) -> &'static str {
        "bot_structure_parsing"
    }

    async fn run(&self, state: &mut WorkflowState, events: &EventSink) -> Result<()> {
        events.emit(self.name(), "Parsing bot configuration");

        let prompt = prompts::structure_prompt(&state.bot_config_document);
        let agent = BotStructureAgent::default();

        match agent.execute(prompt.into()).await {
            Ok(response) => {
                info!(
                    "Bot structure parsed: {} intents, {} flows",
                    response.intents.len(),
                    response.flows.len()
                );
                events.emit(
                    self.name(),
                    format!("Parsed {} intents", response.intents.len()),
                );
                state.structure_analysis_result = render_structure_report(
                    &response.intents,
                    &response.flows,
                    &response.coverage_summary,
                    &response.suggestions,
                );
            }
            Err(e) => {
                // The output field may legitimately stay empty; this step is
                // not gated by the orchestrator
                warn!("Bot structure parsing failed: {:?}", e);
                events.emit(self.name(), format!("Structure parsing failed: {}", e));
            }
        }

        Ok(())
    }
}

/// Render the structure response as the inventory text stored in state
pub fn render_structure_report(
    intents: &[String],
    flows: &[String],
    coverage_summary: &str,
    suggestions: &[String],
) -> String {
    let mut report = String::new();
    report.push_str("# Bot Structure Inventory\n\n## Intents\n");
    for intent in intents {
        report.push_str(&format!("- {}\n", intent));
    }

    report.push_str("\n## Flows\n");
    for flow in flows {
        report.push_str(&format!("- {}\n", flow));
    }

    report.push_str("\n## Coverage\n");
    report.push_str(coverage_summary);

    report.push_str("\n\n## Suggestions\n");
    for suggestion in suggestions {
        report.push_str(&format!("- {}\n", suggestion));
    }

    report
}

// ============================================================================
// Step 4: CSV Artifact Generation
// ============================================================================

/// Generates the training-phrase CSV and persists it through the store
pub struct CsvGenerationStep {
    store: Arc<dyn ArtifactStore>,
}

impl CsvGenerationStep {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WorkflowStep for CsvGenerationStep {
    fn name(&self) -> &'static str {
        "csv_generation"
    }

    async fn run(&self, state: &mut WorkflowState, events: &EventSink) -> Result<()> {
        events.emit(self.name(), "Generating training phrases");

        let structure = (!state.structure_analysis_result.is_empty())
            .then_some(state.structure_analysis_result.as_str());
        let prompt = prompts::training_phrase_prompt(&state.analysis_result, structure);
        let agent = TrainingPhraseAgent::default();

        let rows = match agent.execute(prompt.into()).await {
            Ok(response) => response.rows,
            Err(e) => {
                warn!("Training phrase generation failed: {:?}", e);
                events.emit(self.name(), format!("Generation failed: {}", e));
                return Ok(());
            }
        };

        if rows.is_empty() {
            warn!("Training phrase generation produced no rows");
            events.emit(self.name(), "No training phrases generated");
            return Ok(());
        }

        let csv = render_records(&rows_to_records(&rows));
        let outcome = save_csv_artifact(self.store.as_ref(), &csv, None).await;

        match outcome.status {
            SaveStatus::Success => {
                events.emit(
                    self.name(),
                    format!(
                        "Saved {} training phrases to {}",
                        rows.len(),
                        outcome.filename
                    ),
                );
                state.artifact_result = serde_json::to_string(&outcome)?;
            }
            SaveStatus::Error => {
                warn!(
                    "CSV artifact save failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
                events.emit(self.name(), "Artifact save failed");
            }
        }

        Ok(())
    }
}

/// Convert agent rows into column-ordered records for CSV rendering
pub fn rows_to_records(rows: &[TrainingPhraseRow]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            TRAINING_PHRASE_COLUMNS
                .iter()
                .map(|col| col.to_string())
                .zip([
                    row.intent_name.clone(),
                    row.training_phrase.clone(),
                    row.priority.clone(),
                    row.category.clone(),
                    row.description.clone(),
                ])
                .collect()
        })
        .collect()
}
