//! Final itinerary synthesis.
//!
//! Deterministic substitution into a fixed four-slot prompt (manager persona,
//! research context, retrieved documents, user request), sent as a single
//! non-streaming chat call. The model's text is returned verbatim; a model
//! failure is fatal and propagates with no retry.

use std::sync::Arc;

use crate::{
    chat::{ChatMessage, ChatProvider},
    error::PlannerError,
    splitter::Chunk,
};

const ITINERARY_TEMPLATE: &str = "\
You are an experienced travel agency manager. Write a complete, day-by-day \
itinerary for the customer request below, using the research notes and the \
reference excerpts where they are relevant. Be concrete about events, prices \
and transport when the research mentions them.

Research notes:
{{research}}

Reference excerpts:
{{documents}}

Customer request:
{{request}}";

/// Fills the itinerary template and performs the final model call.
pub struct PlanSynthesizer {
    llm: Arc<dyn ChatProvider>,
}

impl PlanSynthesizer {
    pub fn new(llm: Arc<dyn ChatProvider>) -> Self {
        Self { llm }
    }

    /// Renders the prompt with every slot substituted.
    pub fn render_prompt(request: &str, research: &str, chunks: &[Chunk]) -> String {
        let documents = if chunks.is_empty() {
            "(no reference excerpts retrieved)".to_string()
        } else {
            chunks
                .iter()
                .map(|c| format!("[{} #{}] {}", c.source, c.ordinal, c.text))
                .collect::<Vec<_>>()
                .join("\n\n")
        };
        apply_template(
            ITINERARY_TEMPLATE,
            &[
                ("research", research),
                ("documents", &documents),
                ("request", request),
            ],
        )
    }

    /// Produces the final itinerary text.
    pub async fn synthesize(
        &self,
        request: &str,
        research: &str,
        chunks: &[Chunk],
    ) -> Result<String, PlannerError> {
        let prompt = Self::render_prompt(request, research, chunks);
        let messages = vec![ChatMessage::user().content(prompt).build()];

        let response = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| PlannerError::ModelCallError(e.to_string()))?;
        response
            .text()
            .ok_or_else(|| PlannerError::ModelCallError("no text in model response".to_string()))
    }
}

/// Replaces `{{variable}}` placeholders in a template with values.
fn apply_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in values {
        let pattern = format!("{{{{{key}}}}}");
        result = result.replace(&pattern, value);
    }
    result
}
