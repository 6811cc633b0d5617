//! Unit-test generation capability.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::Tool;
use crate::error::Error;
use crate::message::Message;
use crate::provider::{CompletionBackend, CompletionRequest};

pub struct UnitTestsTool {
    backend: Arc<dyn CompletionBackend>,
    model: String,
}

impl UnitTestsTool {
    pub fn new(backend: Arc<dyn CompletionBackend>, model: String) -> Self {
        Self { backend, model }
    }
}

#[derive(Deserialize)]
struct UnitTestsArgs {
    code: String,
}

#[async_trait::async_trait]
impl Tool for UnitTestsTool {
    fn name(&self) -> &str {
        "create_unit_tests"
    }

    fn description(&self) -> &str {
        "Create unit tests for the provided code"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The code to write unit tests for"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<String, Error> {
        let args: UnitTestsArgs = serde_json::from_value(arguments).map_err(|e| Error::Argument {
            message: format!("create_unit_tests: {e}"),
        })?;

        let prompt = format!(
            "Create unit tests for the following code:\n\n{}\n\nUnit Tests:",
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
