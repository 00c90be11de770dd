//! OpenAI API client implementation
//!
//! Covers the two outbound contracts the pipeline needs from a model
//! provider: chat completions (with tool calling) and embeddings.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::{
    chat::{ChatMessage, ChatProvider, ChatResponse, ChatRole, MessageType, Tool, ToolCall},
    config::PlannerConfig,
    embedding::EmbeddingProvider,
    error::PlannerError,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Client for the OpenAI chat-completion and embedding endpoints.
pub struct OpenAI {
    pub api_key: String,
    pub base_url: Url,
    pub model: String,
    pub embedding_model: String,
    pub temperature: Option<f32>,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<u32>,
    pub client: Client,
}

impl OpenAI {
    /// Creates a new OpenAI client with the specified configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        embedding_model: Option<String>,
        temperature: Option<f32>,
        system: Option<String>,
        timeout_seconds: Option<u64>,
        max_tokens: Option<u32>,
    ) -> Result<Self, PlannerError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }
        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(&base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))
                .map_err(|e| PlannerError::InvalidRequest(format!("invalid base URL: {e}")))?,
            model: model.unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            embedding_model: embedding_model.unwrap_or_else(|| "text-embedding-3-small".to_string()),
            temperature,
            system,
            timeout_seconds,
            max_tokens,
            client: builder
                .build()
                .map_err(|e| PlannerError::HttpError(e.to_string()))?,
        })
    }

    /// Creates a client from a pipeline configuration, with an optional
    /// system prompt prepended to every conversation.
    pub fn from_config(
        config: &PlannerConfig,
        system: Option<String>,
    ) -> Result<Self, PlannerError> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Some(config.model.clone()),
            Some(config.embedding_model.clone()),
            Some(config.temperature),
            system,
            config.timeout_seconds,
            None,
        )
    }
}

#[derive(Serialize, Debug)]
struct OpenAIChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Debug)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: &'static str,
    function: OpenAIFunctionPayload,
}

#[derive(Serialize, Debug)]
struct OpenAIFunctionPayload {
    name: String,
    arguments: String,
}

#[derive(Serialize, Debug)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIChatResponse {
    pub choices: Vec<OpenAIChatChoice>,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIChatChoice {
    pub message: OpenAIChatMsg,
}

#[derive(Deserialize, Debug)]
pub struct OpenAIChatMsg {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatResponse for OpenAIChatResponse {
    fn text(&self) -> Option<String> {
        self.choices.first().and_then(|c| c.message.content.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()
            .and_then(|c| c.message.tool_calls.clone())
    }
}

impl std::fmt::Display for OpenAIChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.choices.first() {
            Some(choice) => {
                if let Some(tool_calls) = &choice.message.tool_calls {
                    for tool_call in tool_calls {
                        writeln!(f, "{}({})", tool_call.function.name, tool_call.function.arguments)?;
                    }
                }
                write!(f, "{}", choice.message.content.as_deref().unwrap_or(""))
            }
            None => write!(f, ""),
        }
    }
}

/// Converts a pipeline chat message into the OpenAI wire format.
///
/// A ToolResult message expands into one "tool" role message per result, so
/// callers must handle that case before reaching here.
fn chat_message_to_api_message(msg: &ChatMessage) -> OpenAIChatMessage {
    OpenAIChatMessage {
        role: match msg.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        },
        content: match &msg.message_type {
            MessageType::Text => Some(msg.content.clone()),
            MessageType::ToolUse(_) => {
                if msg.content.is_empty() {
                    None
                } else {
                    Some(msg.content.clone())
                }
            }
            MessageType::ToolResult(_) => None,
        },
        tool_calls: match &msg.message_type {
            MessageType::ToolUse(calls) => Some(
                calls
                    .iter()
                    .map(|c| OpenAIToolCall {
                        id: c.id.clone(),
                        call_type: "function",
                        function: OpenAIFunctionPayload {
                            name: c.function.name.clone(),
                            arguments: c.function.arguments.clone(),
                        },
                    })
                    .collect(),
            ),
            _ => None,
        },
        tool_call_id: None,
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat_with_tools(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, PlannerError> {
        if self.api_key.is_empty() {
            return Err(PlannerError::AuthError("Missing OpenAI API key".into()));
        }

        let mut openai_msgs: Vec<OpenAIChatMessage> = vec![];
        if let Some(system) = &self.system {
            openai_msgs.push(OpenAIChatMessage {
                role: "system",
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for msg in messages {
            if let MessageType::ToolResult(results) = &msg.message_type {
                for result in results {
                    openai_msgs.push(OpenAIChatMessage {
                        role: "tool",
                        content: Some(result.function.arguments.clone()),
                        tool_calls: None,
                        tool_call_id: Some(result.id.clone()),
                    });
                }
            } else {
                openai_msgs.push(chat_message_to_api_message(msg));
            }
        }

        let body = OpenAIChatRequest {
            model: &self.model,
            messages: openai_msgs,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tools: tools.map(|t| t.to_vec()),
            tool_choice: tools.map(|_| "auto"),
            stream: false,
        };

        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| PlannerError::HttpError(e.to_string()))?;

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("OpenAI request payload: {json}");
            }
        }

        let mut request = self.client.post(url).bearer_auth(&self.api_key).json(&body);
        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;

        log::debug!("OpenAI HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(PlannerError::ResponseFormatError {
                message: format!("OpenAI API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        match serde_json::from_str::<OpenAIChatResponse>(&resp_text) {
            Ok(response) => Ok(Box::new(response)),
            Err(e) => Err(PlannerError::ResponseFormatError {
                message: format!("Failed to decode OpenAI API response: {e}"),
                raw_response: resp_text,
            }),
        }
    }
}

#[derive(Serialize)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
    encoding_format: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[async_trait]
impl EmbeddingProvider for OpenAI {
    async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, PlannerError> {
        if self.api_key.is_empty() {
            return Err(PlannerError::AuthError("Missing OpenAI API key".into()));
        }

        let body = OpenAIEmbeddingRequest {
            model: &self.embedding_model,
            input,
            encoding_format: "float",
        };

        let url = self
            .base_url
            .join("embeddings")
            .map_err(|e| PlannerError::EmbeddingError(e.to_string()))?;

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlannerError::EmbeddingError(e.to_string()))?;

        log::debug!("OpenAI embeddings HTTP status: {}", resp.status());

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(PlannerError::EmbeddingError(format!(
                "OpenAI embeddings returned error status {status}: {error_text}"
            )));
        }

        let json_resp: OpenAIEmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| PlannerError::EmbeddingError(e.to_string()))?;
        Ok(json_resp.data.into_iter().map(|d| d.embedding).collect())
    }
}
