//! Tool-using search agent.
//!
//! The reasoning loop is an explicit finite loop over a tagged action: at
//! each step the model either emits a final answer or requests tool calls,
//! which are dispatched through a typed registry. Tool failures never abort
//! the run; they are folded back into the conversation as observations.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    chat::{ChatMessage, ChatProvider, ChatResponse, FunctionCall, Tool, ToolCall},
    error::PlannerError,
    tools::ToolExecutor,
};

/// What the model decided to do with its turn.
#[derive(Debug)]
pub enum AgentAction {
    /// Terminate the loop and return this text
    FinalAnswer(String),
    /// Invoke these tools and continue reasoning over their results
    ToolCalls(Vec<ToolCall>),
}

/// Arguments every registered tool accepts.
#[derive(Deserialize)]
struct ToolArgs {
    query: String,
}

const AGENT_SYSTEM_PROMPT: &str = "You are a travel research assistant. Use the available \
tools to gather current, concrete information about the user's trip: events, prices, \
transport and background about the destination. When you have enough material, reply \
with a research summary instead of calling more tools.";

/// An agent that iteratively decides, from free-text reasoning, whether to
/// answer or invoke a tool. The loop is bounded by a step budget; when the
/// budget runs out the agent returns its best partial answer rather than
/// failing.
pub struct SearchAgent {
    llm: Arc<dyn ChatProvider>,
    tools: Vec<Box<dyn ToolExecutor>>,
    max_steps: u32,
}

impl SearchAgent {
    /// Creates an agent over a chat provider and a fixed tool registry.
    pub fn new(llm: Arc<dyn ChatProvider>, tools: Vec<Box<dyn ToolExecutor>>, max_steps: u32) -> Self {
        Self {
            llm,
            tools,
            max_steps,
        }
    }

    /// System prompt suitable for the agent's chat provider.
    pub fn system_prompt() -> &'static str {
        AGENT_SYSTEM_PROMPT
    }

    /// Researches a travel request and returns a free-text summary.
    ///
    /// Model-call failures propagate; tool failures do not.
    pub async fn run(&self, request: &str) -> Result<String, PlannerError> {
        let tool_defs: Vec<Tool> = self.tools.iter().map(|t| t.definition()).collect();
        let mut conversation = vec![ChatMessage::user().content(request).build()];
        let mut observations: Vec<String> = Vec::new();

        for step in 0..self.max_steps {
            let response = self
                .llm
                .chat_with_tools(&conversation, Some(&tool_defs))
                .await
                .map_err(|e| PlannerError::ModelCallError(e.to_string()))?;

            match classify(response.as_ref()) {
                AgentAction::FinalAnswer(text) => {
                    log::debug!("agent finished after {} step(s)", step + 1);
                    return Ok(text);
                }
                AgentAction::ToolCalls(calls) => {
                    conversation.push(
                        ChatMessage::assistant()
                            .tool_use(calls.clone())
                            .content(response.text().unwrap_or_default())
                            .build(),
                    );

                    let mut results = Vec::new();
                    for call in &calls {
                        let observation = match self.execute(call).await {
                            Ok(output) => output,
                            // Recoverable: the model sees the failure and may
                            // retry with a different tool or query.
                            Err(e) => format!("Tool {} failed: {e}", call.function.name),
                        };
                        log::debug!(
                            "agent step {}: {} -> {} chars",
                            step + 1,
                            call.function.name,
                            observation.len()
                        );
                        observations.push(observation.clone());
                        results.push(ToolCall {
                            id: call.id.clone(),
                            call_type: call.call_type.clone(),
                            function: FunctionCall {
                                name: call.function.name.clone(),
                                arguments: observation,
                            },
                        });
                    }
                    conversation.push(ChatMessage::user().tool_result(results).content("").build());
                }
            }
        }

        log::debug!("agent step budget exhausted, returning partial answer");
        Ok(best_partial_answer(request, &observations))
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, PlannerError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == call.function.name)
            .ok_or_else(|| {
                PlannerError::ToolError(format!("unknown tool: {}", call.function.name))
            })?;

        let query = match serde_json::from_str::<ToolArgs>(&call.function.arguments) {
            Ok(args) => args.query,
            // Some models pass bare strings instead of a JSON object.
            Err(_) => call.function.arguments.trim_matches('"').to_string(),
        };
        tool.call(&query).await
    }
}

/// Maps a provider response onto the agent's action variant.
fn classify(response: &dyn ChatResponse) -> AgentAction {
    match response.tool_calls() {
        Some(calls) if !calls.is_empty() => AgentAction::ToolCalls(calls),
        _ => AgentAction::FinalAnswer(response.text().unwrap_or_default()),
    }
}

/// Builds a best-effort summary from gathered observations when the step
/// budget runs out before the model emits a final answer.
fn best_partial_answer(request: &str, observations: &[String]) -> String {
    if observations.is_empty() {
        return format!("No research results could be gathered for: {request}");
    }
    format!(
        "Partial research notes for \"{request}\":\n{}",
        observations.join("\n---\n")
    )
}
