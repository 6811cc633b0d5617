//! Capability registry and tool-call dispatch.
//!
//! The model may answer a completion with tool invocations instead of text.
//! Each invocation names a capability in the fixed registry built at
//! startup: documentation generation, unit-test generation, and document
//! persistence. Unknown names and malformed arguments fail the exchange
//! loudly — nothing is silently skipped.

pub mod docs_tool;
pub mod save_document;
pub mod unit_tests_tool;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use docs_tool::DocumentationTool;
use save_document::SaveDocumentTool;
use unit_tests_tool::UnitTestsTool;

use crate::conversation::Conversation;
use crate::error::Error;
use crate::message::{Message, ToolCall};
use crate::provider::{CompletionBackend, ToolDefinition};

/// Every capability implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this capability.
    fn name(&self) -> &str;

    /// Human-readable description advertised to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the capability's arguments.
    fn schema(&self) -> Value;

    /// Execute with already-parsed JSON arguments. Implementations validate
    /// through serde structs and return [`Error::Argument`] for malformed
    /// payloads.
    async fn execute(&self, arguments: Value) -> Result<String, Error>;
}

/// Holds all registered capabilities and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registers a capability. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Produces definitions for the LLM, sent with tool-enabled requests.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Looks up a capability by name and executes it.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<String, Error> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::UnresolvedCapability {
                name: name.to_string(),
            })?;
        tool.execute(arguments).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Creates a registry with the built-in capabilities. The LLM-backed
    /// generators share the chatbot's backend handle; saved documents land
    /// under `documents_dir`.
    pub fn with_builtins(
        backend: Arc<dyn CompletionBackend>,
        model: impl Into<String>,
        documents_dir: PathBuf,
    ) -> Self {
        let model = model.into();
        let mut registry = Self::new();
        registry.register(Box::new(DocumentationTool::new(
            Arc::clone(&backend),
            model.clone(),
        )));
        registry.register(Box::new(UnitTestsTool::new(backend, model)));
        registry.register(Box::new(SaveDocumentTool::new(documents_dir)));
        registry
    }
}

/// Resolves every tool call in a completion response, appending one tool
/// turn per call. Fails fast on the first unresolvable name or bad argument
/// payload; the orchestrator rolls the conversation back in that case.
pub async fn dispatch_tool_calls(
    registry: &ToolRegistry,
    conversation: &mut Conversation,
    calls: &[ToolCall],
) -> Result<(), Error> {
    for call in calls {
        info!(capability = %call.name, call_id = %call.id, "dispatching tool call");
        let output = registry.execute(&call.name, call.arguments.clone()).await?;
        conversation.append(Message::tool_result(&call.id, output));
    }
    Ok(())
}
