//! Completion provider abstraction.
//!
//! The conversation core talks to the remote model through the
//! [`CompletionBackend`] trait: one call in, one response out. The shipped
//! implementation speaks the OpenAI-compatible chat-completions wire format
//! ([`openai::OpenAiBackend`]); tests substitute scripted backends.

pub mod openai;

pub use openai::OpenAiBackend;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::message::{Message, ToolCall};

/// Definition sent to the LLM so it knows what capabilities are available.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the capability's arguments.
    pub parameters: Value,
}

/// One chat-completion request: the conversation turns plus sampling
/// parameters and the optional tool schemas.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    /// Empty means the request offers no tools.
    pub tools: Vec<ToolDefinition>,
}

/// What came back: assistant text and any tool invocations the model wants.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// A remote chat-completion API.
///
/// Implementations classify failures through [`Error`]: HTTP 429 maps to
/// [`Error::RateLimited`], 5xx to [`Error::ServerStatus`], anything else to
/// the fatal [`Error::Completion`]. The retry wrapper relies on that
/// classification.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error>;
}
