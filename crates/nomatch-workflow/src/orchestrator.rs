//! Workflow orchestrator
//!
//! Sequences the four steps, relays their progress events upward unchanged,
//! and gates on each step's designated output field. An empty gated field is
//! a definitive failure for the invocation; the orchestrator logs a warning
//! and stops without re-invoking anything.

use crate::events::{EventSink, StepEvent};
use crate::steps::{
    AnalysisStep, CsvGenerationStep, RetrievalStep, StructureParsingStep, WorkflowStep,
};
use crate::Result;
use nomatch_core::{ArtifactStore, QueryExecutor, WorkflowState};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Where a workflow invocation ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Init,
    Retrieving,
    Analyzing,
    StructureParsing,
    Generating,
    Done,
    /// A gated step produced an empty result; the run stopped early
    Aborted,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowPhase::Init => "init",
            WorkflowPhase::Retrieving => "retrieving",
            WorkflowPhase::Analyzing => "analyzing",
            WorkflowPhase::StructureParsing => "structure_parsing",
            WorkflowPhase::Generating => "generating",
            WorkflowPhase::Done => "done",
            WorkflowPhase::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

/// Orchestrator for the no-match analysis workflow
///
/// Holds the four step executors and the caller's event sink. One
/// orchestrator can run many invocations; all per-invocation data lives in
/// the [`WorkflowState`] passed to [`Orchestrator::run`].
pub struct Orchestrator {
    retrieval: Box<dyn WorkflowStep>,
    analysis: Box<dyn WorkflowStep>,
    structure: Box<dyn WorkflowStep>,
    generation: Box<dyn WorkflowStep>,
    sink: EventSink,
}

impl Orchestrator {
    /// Build an orchestrator from explicit step executors
    pub fn new(
        retrieval: Box<dyn WorkflowStep>,
        analysis: Box<dyn WorkflowStep>,
        structure: Box<dyn WorkflowStep>,
        generation: Box<dyn WorkflowStep>,
        sink: EventSink,
    ) -> Self {
        Self {
            retrieval,
            analysis,
            structure,
            generation,
            sink,
        }
    }

    /// Build the standard LLM-backed pipeline over the given services
    pub fn with_services(
        executor: Arc<dyn QueryExecutor>,
        store: Arc<dyn ArtifactStore>,
        sink: EventSink,
    ) -> Self {
        Self::new(
            Box::new(RetrievalStep::new(executor)),
            Box::new(AnalysisStep),
            Box::new(StructureParsingStep),
            Box::new(CsvGenerationStep::new(store)),
            sink,
        )
    }

    /// Execute the workflow against an initialized state
    ///
    /// Returns the terminal phase; the mutated state is the other observable
    /// output. Empty-result aborts are not errors.
    pub async fn run(&self, state: &mut WorkflowState) -> Result<WorkflowPhase> {
        info!("Starting no-match analysis workflow");
        debug!("Entering phase: {}", WorkflowPhase::Init);

        // Step 1: conversation data retrieval
        debug!("Entering phase: {}", WorkflowPhase::Retrieving);
        self.run_step(self.retrieval.as_ref(), state).await?;
        info!(
            "Conversation data retrieved: {} characters",
            state.retrieval_result.len()
        );
        if state.retrieval_result.is_empty() {
            warn!("No conversation data retrieved. Ending workflow.");
            return Ok(WorkflowPhase::Aborted);
        }

        // Step 2: no-match analysis
        debug!("Entering phase: {}", WorkflowPhase::Analyzing);
        self.run_step(self.analysis.as_ref(), state).await?;
        info!(
            "No-match analysis completed: {} characters",
            state.analysis_result.len()
        );
        if state.analysis_result.is_empty() {
            warn!("No no-match analysis results. Ending workflow.");
            return Ok(WorkflowPhase::Aborted);
        }

        // Step 3: bot structure parsing, only when a config document exists
        if state.bot_config_document.is_empty() {
            info!("Skipping bot structure parsing (no configuration document provided)");
        } else {
            debug!("Entering phase: {}", WorkflowPhase::StructureParsing);
            self.run_step(self.structure.as_ref(), state).await?;
            info!(
                "Bot structure parsing completed: {} characters",
                state.structure_analysis_result.len()
            );
        }

        // Step 4: CSV artifact generation
        debug!("Entering phase: {}", WorkflowPhase::Generating);
        self.run_step(self.generation.as_ref(), state).await?;
        info!(
            "CSV generation completed: {} characters",
            state.artifact_result.len()
        );
        if state.artifact_result.is_empty() {
            warn!("No CSV generation results.");
            return Ok(WorkflowPhase::Aborted);
        }

        info!("No-match analysis workflow completed successfully");
        Ok(WorkflowPhase::Done)
    }

    /// Run one step, relaying its events to the caller's sink in order
    ///
    /// The step writes into its own channel; a relay task forwards each event
    /// unchanged while the step runs, and the relay is drained completely
    /// before the next step starts.
    async fn run_step(&self, step: &dyn WorkflowStep, state: &mut WorkflowState) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<StepEvent>();
        let step_sink = EventSink::new(tx);
        let caller_sink = self.sink.clone();
        let step_name = step.name();

        let relay = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                debug!("[{}] {}", event.step, event.message);
                caller_sink.forward(event);
            }
        });

        let result = step.run(state, &step_sink).await;
        drop(step_sink);

        if relay.await.is_err() {
            warn!("Event relay for step {} ended abnormally", step_name);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display_names() {
        assert_eq!(WorkflowPhase::Init.to_string(), "init");
        assert_eq!(WorkflowPhase::Retrieving.to_string(), "retrieving");
        assert_eq!(WorkflowPhase::StructureParsing.to_string(), "structure_parsing");
        assert_eq!(WorkflowPhase::Done.to_string(), "done");
        assert_eq!(WorkflowPhase::Aborted.to_string(), "aborted");
    }
}
