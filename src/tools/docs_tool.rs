//! Documentation generation capability.
//!
//! Wraps a one-shot completion: the provided code is embedded in a fixed
//! prompt and the model's answer is returned as the tool result.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::Tool;
use crate::error::Error;
use crate::message::Message;
use crate::provider::{CompletionBackend, CompletionRequest};

pub struct DocumentationTool {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl DocumentationTool {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: String) -> Self {
        Self { backend, model }
    }
}

#[derive(Deserialize)]
struct DocumentationArgs {
    code: String,
}

#[async_trait::async_trait]
impl Tool for DocumentationTool {
    fn name(&self) -> &str {
        "create_documentation"
    }

    fn description(&self) -> &str {
        "Create documentation for the provided code"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The code to document"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, Error> {
        let args: DocumentationArgs =
            serde_json::from_value(arguments).map_err(|e| Error::Argument {
                message: format!("create_documentation: {e}"),
            })?;

        let prompt = format!(
            "Create documentation for the following code:\n\n{}\n\nDocumentation:",
            args.code
        );
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system("You are a helpful assistant."),
                Message::user(prompt),
            ],
            temperature: crate::constants::DEFAULT_TEMPERATURE,
            frequency_penalty: crate::constants::DEFAULT_FREQUENCY_PENALTY,
            presence_penalty: crate::constants::DEFAULT_PRESENCE_PENALTY,
            tools: Vec::new(),
        };
        let response = self.backend.complete(&request).await?;
        Ok(response.content)
    }
}
