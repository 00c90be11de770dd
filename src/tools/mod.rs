//! External capabilities exposed to the search agent.
//!
//! Each tool has a narrow input/output contract: a free-text query in, a
//! textual observation out. Tool failures are recoverable by design; the
//! agent folds them back into its reasoning instead of aborting the run.

mod search;
mod wikipedia;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::chat::{FunctionTool, Tool};
use crate::error::PlannerError;

pub use search::DuckDuckGoSearch;
pub use wikipedia::WikipediaLookup;

/// A typed tool the agent can invoke by name.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tool identifier the model uses to request this tool.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Executes the tool with a free-text query and returns an observation.
    async fn call(&self, query: &str) -> Result<String, PlannerError>;

    /// Function-call definition advertised to the chat provider.
    fn definition(&self) -> Tool {
        Tool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: query_schema(),
            },
        }
    }
}

/// JSON Schema shared by both tools: a single required "query" string.
fn query_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            }
        },
        "required": ["query"]
    })
}

/// Truncates text to at most `max_len` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
