//! Integration tests for the orchestrator state machine
//!
//! Steps are scripted so no LLM backend or warehouse is needed; the tests
//! exercise the gates, the conditional branch, and the event relay.

use async_trait::async_trait;
use nomatch_core::WorkflowState;
use nomatch_workflow::{EventSink, Orchestrator, WorkflowPhase, WorkflowStep};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Apply = Box<dyn Fn(&mut WorkflowState) + Send + Sync>;

/// A step that applies a scripted mutation and records that it ran
struct ScriptedStep {
    name: &'static str,
    apply: Apply,
    ran: Arc<AtomicBool>,
}

impl ScriptedStep {
    fn new(name: &'static str, apply: Apply) -> (Box<dyn WorkflowStep>, Arc<AtomicBool>) {
        let ran = Arc::new(AtomicBool::new(false));
        let step = Box::new(Self {
            name,
            apply,
            ran: ran.clone(),
        });
        (step, ran)
    }
}

#[async_trait]
impl WorkflowStep for ScriptedStep {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(
        &self,
        state: &mut WorkflowState,
        events: &EventSink,
    ) -> nomatch_workflow::Result<()> {
        self.ran.store(true, Ordering::SeqCst);
        events.emit(self.name, format!("{} running", self.name));
        (self.apply)(state);
        Ok(())
    }
}

struct Pipeline {
    orchestrator: Orchestrator,
    events: tokio::sync::mpsc::UnboundedReceiver<nomatch_workflow::StepEvent>,
    ran: [Arc<AtomicBool>; 4],
}

fn pipeline(
    retrieval_out: &'static str,
    analysis_out: &'static str,
    structure_out: &'static str,
    artifact_out: &'static str,
) -> Pipeline {
    let (retrieval, r1) = ScriptedStep::new(
        "retrieval",
        Box::new(move |s| s.retrieval_result = retrieval_out.to_string()),
    );
    let (analysis, r2) = ScriptedStep::new(
        "analysis",
        Box::new(move |s| s.analysis_result = analysis_out.to_string()),
    );
    let (structure, r3) = ScriptedStep::new(
        "structure",
        Box::new(move |s| s.structure_analysis_result = structure_out.to_string()),
    );
    let (generation, r4) = ScriptedStep::new(
        "generation",
        Box::new(move |s| s.artifact_result = artifact_out.to_string()),
    );

    let (sink, events) = EventSink::channel();
    Pipeline {
        orchestrator: Orchestrator::new(retrieval, analysis, structure, generation, sink),
        events,
        ran: [r1, r2, r3, r4],
    }
}

fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<nomatch_workflow::StepEvent>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(event) = events.try_recv() {
        messages.push(format!("{}: {}", event.step, event.message));
    }
    messages
}

#[tokio::test]
async fn test_full_run_without_bot_config() {
    let mut p = pipeline("transcripts", "report", "inventory", "saved");
    let mut state = WorkflowState::default();

    let phase = p.orchestrator.run(&mut state).await.unwrap();

    assert_eq!(phase, WorkflowPhase::Done);
    assert!(p.ran[0].load(Ordering::SeqCst));
    assert!(p.ran[1].load(Ordering::SeqCst));
    // No bot config document: structure step never executes
    assert!(!p.ran[2].load(Ordering::SeqCst));
    assert!(p.ran[3].load(Ordering::SeqCst));
    assert!(state.structure_analysis_result.is_empty());
    assert_eq!(state.artifact_result, "saved");
}

#[tokio::test]
async fn test_structure_step_runs_before_generation_when_config_present() {
    let mut p = pipeline("transcripts", "report", "inventory", "saved");
    let mut state = WorkflowState {
        bot_config_document: "{\"intents\": []}".to_string(),
        ..Default::default()
    };

    let phase = p.orchestrator.run(&mut state).await.unwrap();

    assert_eq!(phase, WorkflowPhase::Done);
    assert!(p.ran[2].load(Ordering::SeqCst));
    assert_eq!(state.structure_analysis_result, "inventory");

    let messages = drain(&mut p.events);
    let structure_pos = messages.iter().position(|m| m.starts_with("structure")).unwrap();
    let generation_pos = messages.iter().position(|m| m.starts_with("generation")).unwrap();
    assert!(structure_pos < generation_pos);
}

#[tokio::test]
async fn test_empty_retrieval_aborts_before_analysis() {
    let mut p = pipeline("", "report", "inventory", "saved");
    let mut state = WorkflowState::default();

    let phase = p.orchestrator.run(&mut state).await.unwrap();

    assert_eq!(phase, WorkflowPhase::Aborted);
    assert!(p.ran[0].load(Ordering::SeqCst));
    assert!(!p.ran[1].load(Ordering::SeqCst));
    assert!(!p.ran[3].load(Ordering::SeqCst));
    assert!(state.artifact_result.is_empty());

    // Partial progress is still delivered
    let messages = drain(&mut p.events);
    assert_eq!(messages, vec!["retrieval: retrieval running"]);
}

#[tokio::test]
async fn test_empty_analysis_aborts_before_structure_and_generation() {
    let mut p = pipeline("transcripts", "", "inventory", "saved");
    let mut state = WorkflowState {
        bot_config_document: "config".to_string(),
        ..Default::default()
    };

    let phase = p.orchestrator.run(&mut state).await.unwrap();

    assert_eq!(phase, WorkflowPhase::Aborted);
    assert!(!p.ran[2].load(Ordering::SeqCst));
    assert!(!p.ran[3].load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_empty_generation_aborts_with_warning() {
    let mut p = pipeline("transcripts", "report", "inventory", "");
    let mut state = WorkflowState::default();

    let phase = p.orchestrator.run(&mut state).await.unwrap();

    assert_eq!(phase, WorkflowPhase::Aborted);
    assert!(p.ran[3].load(Ordering::SeqCst));
    assert!(state.artifact_result.is_empty());
}

#[tokio::test]
async fn test_events_relayed_in_order_across_steps() {
    let mut p = pipeline("transcripts", "report", "inventory", "saved");
    let mut state = WorkflowState::default();

    p.orchestrator.run(&mut state).await.unwrap();

    let messages = drain(&mut p.events);
    assert_eq!(
        messages,
        vec![
            "retrieval: retrieval running",
            "analysis: analysis running",
            "generation: generation running",
        ]
    );
}
