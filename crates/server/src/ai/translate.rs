//! Natural language to structured query translation

use nlq_core::{FilterSpec, LanguageModel, generate_prompt};

use crate::error::AppError;

/// Convert a natural-language request into a normalized [`FilterSpec`].
///
/// Builds the prompt, makes the single LLM call, and normalizes the raw
/// response. No retries: a failed or unparseable response aborts the request.
pub async fn translate<L: LanguageModel>(llm: &L, text: &str) -> Result<FilterSpec, AppError> {
    let prompt = generate_prompt(text);
    let raw = llm.generate(&prompt).await?;
    let spec = FilterSpec::from_llm_text(&raw)?;

    tracing::info!(
        where_clause = spec.where_clause.as_deref().unwrap_or(""),
        vector_phrase = spec.vector_phrase().unwrap_or(""),
        "Translated natural language input"
    );

    Ok(spec)
}
