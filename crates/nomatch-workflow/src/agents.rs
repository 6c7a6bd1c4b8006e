//! Agent definitions for nomatch-workflow
//!
//! This module contains Agent trait implementations using llm-toolkit's Agent
//! derive macro. Agents are kept in a separate module to avoid conflicts with
//! the Result<T> type alias.

use llm_toolkit::{agent, type_marker, ToPrompt};
use serde::{Deserialize, Serialize};

/// Date window resolved from the caller's natural-language request
///
/// The retrieval step turns this into the fixed no-match SQL template. When
/// the request names no usable range the step falls back to the most recent
/// 7 days.
#[type_marker]
#[derive(Serialize, Deserialize, Debug, Clone, ToPrompt)]
#[prompt(mode = "full")]
pub struct DateWindowResponse {
    /// Start date in YYYY-MM-DD format
    pub start_date: String,

    /// End date in YYYY-MM-DD format (inclusive)
    pub end_date: String,

    /// Whether the request contained an explicit or clearly implied range
    pub explicit: bool,
}

/// Agent for extracting a concrete date range from a retrieval request
#[agent(
    expertise = r#"You are a conversation data retrieval specialist focused on no-match analysis.

Your task is to:
1. Read the user's retrieval request and the table metadata provided as context
2. Extract the date range the user is asking about
3. Convert relative ranges ("last week", "this month") into concrete dates
4. When no range is mentioned, report the most recent 7 days and set explicit to false

Date handling:
- Output dates in YYYY-MM-DD format
- start_date must not be after end_date
- Set explicit to true only when the request names or clearly implies a range

Output a single, valid JSON object with the structure defined by the `DateWindowResponse` type. Do not include any other text or explanations outside of the JSON object."#,
    output = "DateWindowResponse",
    backend = "claude"
)]
pub struct DateWindowAgent;

// ============================================================================
// No-Match Analysis
// ============================================================================

/// Structured analysis of conversations with no-match events
///
/// Each list entry is a self-contained block of report text; the analysis
/// step renders the blocks into the final report. The system performs no
/// mechanical validation of the content.
#[type_marker]
#[derive(Serialize, Deserialize, Debug, Clone, ToPrompt)]
#[prompt(mode = "full")]
pub struct AnalysisReportResponse {
    /// Summary counts: conversations analyzed, total no-match turns, the most
    /// affected conversations
    pub summary: String,

    /// Named no-match patterns. Each entry states the pattern name, its
    /// frequency, example utterances, the likely root cause, and a remedy
    pub patterns: Vec<String>,

    /// Missing intents. Each entry names the proposed intent, lists proposed
    /// training phrases, and assigns a High/Medium/Low priority tier
    pub intent_gaps: Vec<String>,

    /// Prioritized, concrete actions to reduce no-match events
    pub priority_actions: Vec<String>,
}

/// Agent for analyzing no-match events and recommending fixes
#[agent(
    expertise = r#"You are an expert at analyzing chatbot conversations where intent recognition failed.

Your task is to:
1. Read the conversation transcripts and their no-match counts
2. Summarize what you see: how many conversations, how many failed turns, which conversations are worst
3. Identify recurring no-match patterns. For each pattern state:
   - A short pattern name
   - How often it occurs
   - Example user utterances
   - The likely root cause
   - A concrete remedy
4. Identify missing intents. For each gap state:
   - The proposed intent name
   - 3-5 proposed training phrases
   - A priority tier: High, Medium, or Low
5. Produce a prioritized action list

Guidelines:
- Ground every finding in the transcripts; quote real utterances as examples
- Prefer a few well-evidenced patterns over many speculative ones
- Priorities reflect user impact: frequent and blocking issues are High

Output a single, valid JSON object with the structure defined by the `AnalysisReportResponse` type. Do not include any other text or explanations outside of the JSON object."#,
    output = "AnalysisReportResponse",
    backend = "claude"
)]
pub struct NoMatchAnalysisAgent;

// ============================================================================
// Bot Structure Parsing
// ============================================================================

/// Inventory of an exported bot configuration
#[type_marker]
#[derive(Serialize, Deserialize, Debug, Clone, ToPrompt)]
#[prompt(mode = "full")]
pub struct BotStructureResponse {
    /// Existing intents. Each entry names the intent and lists its training
    /// phrases and parameters
    pub intents: Vec<String>,

    /// Flow and page topology: which flows exist and how pages connect
    pub flows: Vec<String>,

    /// Training-phrase coverage statistics: counts per intent, thin spots,
    /// overlap between intents
    pub coverage_summary: String,

    /// Optimization suggestions for the existing structure
    pub suggestions: Vec<String>,
}

/// Agent for parsing an exported bot configuration document
#[agent(
    expertise = r#"You are an expert at reading exported Dialogflow CX bot configurations.

Your task is to:
1. Parse the provided configuration document
2. Inventory the existing intents: names, training phrases, parameters
3. Describe the flow and page topology
4. Summarize training-phrase coverage: which intents are well covered, which are thin, where phrases overlap between intents
5. Suggest structural optimizations

Guidelines:
- Report only what the document actually contains; do not invent intents
- Note malformed or truncated sections instead of guessing their content

Output a single, valid JSON object with the structure defined by the `BotStructureResponse` type. Do not include any other text or explanations outside of the JSON object."#,
    output = "BotStructureResponse",
    backend = "claude"
)]
pub struct BotStructureAgent;

// ============================================================================
// Training Phrase Generation
// ============================================================================

/// One suggested training phrase for the CSV export
#[derive(Serialize, Deserialize, Debug, Clone, ToPrompt)]
pub struct TrainingPhraseRow {
    /// Intent the phrase belongs to, e.g. "AccountSuspensionIntent"
    pub intent_name: String,

    /// The example user utterance
    pub training_phrase: String,

    /// Priority tier: High, Medium, or Low
    pub priority: String,

    /// "New Intent" when the intent does not exist yet, "Existing Intent"
    /// when the phrase extends one the bot already has
    pub category: String,

    /// What the intent handles
    pub description: String,
}

/// Rows for the training-phrase CSV artifact
#[type_marker]
#[derive(Serialize, Deserialize, Debug, Clone, ToPrompt)]
#[prompt(mode = "full")]
pub struct TrainingPhraseResponse {
    /// Suggested training phrases, grouped by intent, highest priority first
    pub rows: Vec<TrainingPhraseRow>,
}

/// Agent for synthesizing importable training phrases from the analysis
#[agent(
    expertise = r#"You are an expert at writing training phrases for intent classifiers.

Your task is to:
1. Read the no-match analysis report (and the bot structure inventory, when provided)
2. For every intent gap, produce 3-8 training phrases per intent
3. When a bot structure inventory is provided, also extend thin existing intents and mark those rows as "Existing Intent"
4. Assign each row the priority tier from the analysis

Guidelines:
- Phrases must read like real user messages: varied length, wording, and formality
- Do not duplicate phrases the bot already has
- Keep intent names in UpperCamelCase ending in "Intent"
- Group rows by intent, highest priority first

Output a single, valid JSON object with the structure defined by the `TrainingPhraseResponse` type. Do not include any other text or explanations outside of the JSON object."#,
    output = "TrainingPhraseResponse",
    backend = "claude"
)]
pub struct TrainingPhraseAgent;
