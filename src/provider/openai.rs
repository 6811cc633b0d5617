//! OpenAI-compatible chat-completions client.
//!
//! Serializes a [`CompletionRequest`] into the `/chat/completions` wire
//! format and maps HTTP status classes onto the error taxonomy: 429 is a
//! rate limit, 5xx is an upstream server error, everything else is fatal.
//! Works against api.openai.com or any compatible endpoint via `base_url`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CompletionBackend, CompletionRequest, CompletionResponse};
use crate::error::Error;
use crate::message::{Message, Role, ToolCall};

/// HTTP client for one chat-completions endpoint.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool<'a>>>,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireCalledFunction,
}

#[derive(Serialize, Deserialize)]
struct WireCalledFunction {
    name: String,
    /// The wire format carries arguments as a JSON-encoded string.
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn to_wire_messages(messages: &[Message]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: role_name(m.role),
            content: m.content.clone(),
            tool_calls: if m.tool_calls.is_empty() {
                None
            } else {
                Some(
                    m.tool_calls
                        .iter()
                        .map(|c| WireToolCall {
                            id: c.id.clone(),
                            kind: "function".to_string(),
                            function: WireCalledFunction {
                                name: c.name.clone(),
                                arguments: c.arguments.to_string(),
                            },
                        })
                        .collect(),
                )
            },
            tool_call_id: m.tool_call_id.clone(),
        })
        .collect()
}

fn parse_tool_calls(wire: Vec<WireToolCall>) -> Result<Vec<ToolCall>, Error> {
    wire.into_iter()
        .map(|c| {
            let arguments: Value =
                serde_json::from_str(&c.function.arguments).map_err(|e| Error::Argument {
                    message: format!(
                        "tool call {} carried unparseable arguments: {e}",
                        c.function.name
                    ),
                })?;
            Ok(ToolCall {
                id: c.id,
                name: c.function.name,
                arguments,
            })
        })
        .collect()
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error> {
        let wire_request = WireRequest {
            model: &request.model,
            messages: to_wire_messages(&request.messages),
            temperature: request.temperature,
            frequency_penalty: request.frequency_penalty,
            presence_penalty: request.presence_penalty,
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(
                    request
                        .tools
                        .iter()
                        .map(|t| WireTool {
                            kind: "function",
                            function: WireFunction {
                                name: &t.name,
                                description: &t.description,
                                parameters: &t.parameters,
                            },
                        })
                        .collect(),
                )
            },
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, turns = request.messages.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| Error::Completion {
                message: format!("request to {url} failed: {e}"),
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(Error::RateLimited);
        }
        if status.is_server_error() {
            return Err(Error::ServerStatus {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion {
                message: format!("completion API returned {status}: {body}"),
            });
        }

        let wire: WireResponse = response.json().await.map_err(|e| Error::Completion {
            message: format!("failed to parse completion response: {e}"),
        })?;
        let choice = wire.choices.into_iter().next().ok_or_else(|| Error::Completion {
            message: "completion API returned no choices".to_string(),
        })?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: parse_tool_calls(choice.message.tool_calls)?,
        })
    }
}
