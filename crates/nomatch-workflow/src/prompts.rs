//! Prompt builders for the workflow steps

use nomatch_core::ColumnMetadata;

/// Prompt for resolving the retrieval date window
pub fn date_window_prompt(pending_query: &str, schema: &[ColumnMetadata]) -> String {
    let schema_section = if schema.is_empty() {
        "(no table metadata available)".to_string()
    } else {
        schema
            .iter()
            .map(|col| {
                format!(
                    "- {}.{} ({}): {}",
                    col.table_name, col.column_name, col.data_type, col.description
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Retrieval request:\n{}\n\n\
         Available table metadata:\n{}\n\n\
         Resolve the date range this request asks about.",
        pending_query, schema_section
    )
}

/// Prompt for the no-match analysis step
pub fn analysis_prompt(retrieval_result: &str) -> String {
    format!(
        "The following conversations contain no-match events. Each row has a \
         conversation id, the concatenated user utterances, and the number of \
         turns where intent recognition failed.\n\n\
         =====================================================================\n\
         Conversation Data Start\n\
         =====================================================================\n\
         {}\n\
         =====================================================================\n\
         Conversation Data End\n\
         =====================================================================\n\n\
         Analyze the no-match patterns and recommend fixes.",
        retrieval_result
    )
}

/// Prompt for the bot structure-parsing step
pub fn structure_prompt(bot_config_document: &str) -> String {
    format!(
        "Exported bot configuration:\n\n```\n{}\n```\n\n\
         Inventory the intents, flows, and training-phrase coverage of this bot.",
        bot_config_document
    )
}

/// Prompt for the training-phrase generation step
pub fn training_phrase_prompt(analysis: &str, structure: Option<&str>) -> String {
    let structure_section = structure
        .map(|s| format!("\n\nBot Structure Inventory:\n{}", s))
        .unwrap_or_default();

    format!(
        "No-Match Analysis Report:\n{}{}\n\n\
         Generate the training phrases needed to close the gaps identified above.",
        analysis, structure_section
    )
}
