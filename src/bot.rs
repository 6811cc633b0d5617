//! Chat orchestration.
//!
//! [`Chatbot`] owns everything one conversation needs: the backend handle,
//! the bounded conversation store, the tokenizer, the tool registry, and the
//! transcript writer. It is constructed explicitly by the front end and
//! passed around by ownership — there is no global instance, so concurrent
//! sessions each own their state outright.
//!
//! One `chat` call: chunk the input if it exceeds the per-request token
//! limit, then for each chunk append a user turn, trim history to the token
//! budget, run the retry-wrapped completion, resolve any tool calls, and
//! append the assistant turn. Chunks are strictly sequential since each
//! round trip feeds the next one's history. A failed call rolls its turns
//! back so the conversation is never left half-mutated.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chunker;
use crate::config::Config;
use crate::conversation::Conversation;
use crate::error::Error;
use crate::message::Message;
use crate::provider::{CompletionBackend, CompletionRequest};
use crate::retry::{with_retry, RetryPolicy};
use crate::tokens::Tokenizer;
use crate::tools::{dispatch_tool_calls, ToolRegistry};
use crate::transcript::Transcript;

/// Request parameters shared by every completion in a session.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub chunk_token_limit: usize,
    pub history_token_budget: usize,
    pub retry: RetryPolicy,
}

impl ChatParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
            chunk_token_limit: config.chunk_token_limit,
            history_token_budget: config.history_token_budget,
            retry: config.retry.clone(),
        }
    }
}

/// One conversational session.
pub struct Chatbot {
    id: String,
    backend: Arc<dyn CompletionBackend>,
    tools: ToolRegistry,
    conversation: Conversation,
    tokenizer: Tokenizer,
    transcript: Transcript,
    params: ChatParams,
}

impl Chatbot {
    /// Builds a session seeded with `system_prompt`. The transcript file is
    /// created immediately, keyed by a fresh conversation id.
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        tools: ToolRegistry,
        params: ChatParams,
        system_prompt: &str,
        transcript_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let id = Uuid::new_v4().to_string();
        let tokenizer = Tokenizer::for_model(&params.model)?;
        let transcript = Transcript::create(transcript_dir, &id)?;
        Ok(Self {
            id,
            backend,
            tools,
            conversation: Conversation::new(system_prompt),
            tokenizer,
            transcript,
            params,
        })
    }

    /// Builds a session against the configured chat-completions endpoint,
    /// with the built-in tool registry.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;
        let api_key = config
            .resolve_api_key()
            .context("No API key found. Set OPENAI_API_KEY or api_key in config.toml")?;
        let backend: Arc<dyn CompletionBackend> =
            Arc::new(crate::provider::OpenAiBackend::new(api_key, config.base_url.clone()));
        let params = ChatParams::from_config(config);
        let tools = ToolRegistry::with_builtins(
            Arc::clone(&backend),
            params.model.clone(),
            Config::documents_dir()?,
        );
        Self::new(
            backend,
            tools,
            params,
            &config.system_prompt,
            Config::transcripts_dir()?,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current history size in tokens, with the trim budget.
    pub fn token_usage(&self) -> (usize, usize) {
        (
            self.tokenizer.count_conversation(self.conversation.messages()),
            self.params.history_token_budget,
        )
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Runs one full exchange and returns the accumulated reply.
    ///
    /// On success the history cap is re-established and the exchange is
    /// appended to the transcript. On failure every turn this call appended
    /// is rolled back before the error is returned.
    pub async fn chat(&mut self, user_input: &str) -> Result<String, Error> {
        let checkpoint = self.conversation.len();
        match self.exchange(user_input).await {
            Ok(reply) => {
                let evicted = self.conversation.evict_oldest_pair();
                if evicted > 0 {
                    debug!(evicted, "restored history cap after exchange");
                }
                if let Err(e) = self.transcript.append(user_input, &reply) {
                    warn!(failure = %e, "failed to append transcript entry");
                }
                Ok(reply)
            }
            Err(e) => {
                self.conversation.truncate(checkpoint);
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, user_input: &str) -> Result<String, Error> {
        let chunks = chunker::split(&self.tokenizer, user_input, self.params.chunk_token_limit)
            .map_err(|e| Error::Argument {
                message: format!("could not chunk input: {e}"),
            })?;
        let total = chunks.len();
        if total > 1 {
            info!(parts = total, "input exceeds the chunk limit, splitting");
        }

        // Intermediate parts are asked to hold their answer, but whatever
        // text a part gets back is recorded and accumulated anyway.
        let mut reply = String::new();
        for chunk in &chunks {
            debug!(part = chunk.index + 1, total, "processing chunk");
            self.conversation.append(Message::user(chunk.prompt_text()));
            let trimmed = self
                .conversation
                .trim_to_token_budget(&self.tokenizer, self.params.history_token_budget);
            if trimmed > 0 {
                debug!(trimmed, "trimmed history to the token budget");
            }
            let text = self.round_trip().await?;
            if !text.is_empty() {
                if !reply.is_empty() {
                    reply.push('\n');
                }
                reply.push_str(&text);
            }
        }
        Ok(reply)
    }

    /// One completion round trip on the current conversation, including
    /// tool-call resolution and the single follow-up request.
    async fn round_trip(&mut self) -> Result<String, Error> {
        let request = self.build_request(true);
        let backend = Arc::clone(&self.backend);
        let response = with_retry(&self.params.retry, || backend.complete(&request)).await?;

        if response.tool_calls.is_empty() {
            self.conversation
                .append(Message::assistant(response.content.clone()));
            return Ok(response.content);
        }

        info!(calls = response.tool_calls.len(), "model requested tool calls");
        self.conversation.append(Message::assistant_with_tool_calls(
            response.content.clone(),
            response.tool_calls.clone(),
        ));
        dispatch_tool_calls(&self.tools, &mut self.conversation, &response.tool_calls).await?;

        // Exactly one follow-up, offered without tool schemas so the model
        // answers in text instead of recursing.
        let follow_up = self.build_request(false);
        let final_response =
            with_retry(&self.params.retry, || backend.complete(&follow_up)).await?;
        self.conversation
            .append(Message::assistant(final_response.content.clone()));
        Ok(final_response.content)
    }

    fn build_request(&self, with_tools: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.params.model.clone(),
            messages: self.conversation.messages().to_vec(),
            temperature: self.params.temperature,
            frequency_penalty: self.params.frequency_penalty,
            presence_penalty: self.params.presence_penalty,
            tools: if with_tools {
                self.tools.definitions()
            } else {
                Vec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::message::{Role, ToolCall};
    use crate::provider::CompletionResponse;

    /// Backend that plays back a fixed script and records every request.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<CompletionResponse, Error>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<CompletionResponse, Error>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn request(&self, n: usize) -> CompletionRequest {
            self.requests.lock().unwrap()[n].clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(Error::Completion {
                    message: "script exhausted".into(),
                })
            })
        }
    }

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("glitch-bot-{}", Uuid::new_v4()))
    }

    fn fast_params() -> ChatParams {
        ChatParams {
            model: crate::constants::DEFAULT_MODEL.to_string(),
            temperature: crate::constants::DEFAULT_TEMPERATURE,
            frequency_penalty: crate::constants::DEFAULT_FREQUENCY_PENALTY,
            presence_penalty: crate::constants::DEFAULT_PRESENCE_PENALTY,
            chunk_token_limit: crate::constants::DEFAULT_CHUNK_TOKEN_LIMIT,
            history_token_budget: crate::constants::DEFAULT_HISTORY_TOKEN_BUDGET,
            retry: RetryPolicy {
                max_attempts: 3,
                initial_delay_ms: 1,
                backoff_multiplier: 1.5,
                max_delay_ms: 5,
            },
        }
    }

    fn bot_with(backend: Arc<ScriptedBackend>, params: ChatParams) -> Chatbot {
        let docs_dir = scratch_dir();
        let tools = ToolRegistry::with_builtins(
            backend.clone() as Arc<dyn CompletionBackend>,
            params.model.clone(),
            docs_dir,
        );
        Chatbot::new(
            backend as Arc<dyn CompletionBackend>,
            tools,
            params,
            "You are a test assistant.",
            scratch_dir(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn hello_appends_one_user_and_one_assistant_turn() {
        let backend = ScriptedBackend::new(vec![Ok(CompletionResponse::text("Hi there!"))]);
        let mut bot = bot_with(backend.clone(), fast_params());

        let reply = bot.chat("Hello").await.unwrap();
        assert_eq!(reply, "Hi there!");
        assert_eq!(backend.calls(), 1);

        let messages = bot.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].text(), "Hello");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].text(), "Hi there!");
    }

    #[tokio::test]
    async fn oversized_input_is_sent_as_sequential_annotated_chunks() {
        let mut params = fast_params();
        params.chunk_token_limit = 8;
        let text = "one two three four five six seven eight nine ten ".repeat(10);

        let tokenizer = Tokenizer::for_model(&params.model).unwrap();
        let expected_parts = tokenizer.count(&text).div_ceil(params.chunk_token_limit);
        assert!(expected_parts > 1);

        let mut script: Vec<Result<CompletionResponse, Error>> = (1..expected_parts)
            .map(|_| Ok(CompletionResponse::text("ok")))
            .collect();
        script.push(Ok(CompletionResponse::text("final answer")));
        let backend = ScriptedBackend::new(script);
        let mut bot = bot_with(backend.clone(), params);

        let reply = bot.chat(&text).await.unwrap();
        assert_eq!(backend.calls(), expected_parts);
        assert!(reply.ends_with("final answer"));
        assert!(reply.starts_with("ok"));

        let first = backend.request(0);
        let first_user = first.messages.last().unwrap();
        assert!(first_user.text().starts_with("[part 1/"));
        assert!(first_user.text().contains("hold your full"));
        let last = backend.request(expected_parts - 1);
        assert!(!last.messages.last().unwrap().text().contains("hold your full"));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::RateLimited),
            Err(Error::ServerStatus { status: 503 }),
            Ok(CompletionResponse::text("recovered")),
        ]);
        let mut bot = bot_with(backend.clone(), fast_params());

        let reply = bot.chat("ping").await.unwrap();
        assert_eq!(reply, "recovered");
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_roll_the_conversation_back() {
        let backend = ScriptedBackend::new(vec![
            Err(Error::RateLimited),
            Err(Error::RateLimited),
            Err(Error::RateLimited),
        ]);
        let mut bot = bot_with(backend.clone(), fast_params());

        let result = bot.chat("ping").await;
        assert!(matches!(result, Err(Error::RetriesExhausted { attempts: 3 })));
        assert_eq!(bot.conversation().len(), 1);
        assert_eq!(bot.conversation().system_turn().role, Role::System);
    }

    #[tokio::test]
    async fn tool_calls_are_resolved_then_one_follow_up_is_issued() {
        let docs_dir = scratch_dir();
        let call = ToolCall {
            id: "call_1".into(),
            name: "save_document".into(),
            arguments: json!({"filename": "summary.md", "content": "the summary"}),
        };
        let backend = ScriptedBackend::new(vec![
            Ok(CompletionResponse {
                content: String::new(),
                tool_calls: vec![call],
            }),
            Ok(CompletionResponse::text("saved it for you")),
        ]);
        let params = fast_params();
        let tools = ToolRegistry::with_builtins(
            backend.clone() as Arc<dyn CompletionBackend>,
            params.model.clone(),
            docs_dir.clone(),
        );
        let mut bot = Chatbot::new(
            backend.clone() as Arc<dyn CompletionBackend>,
            tools,
            params,
            "You are a test assistant.",
            scratch_dir(),
        )
        .unwrap();

        let reply = bot.chat("save a summary").await.unwrap();
        assert_eq!(reply, "saved it for you");
        assert_eq!(backend.calls(), 2);
        assert_eq!(
            std::fs::read_to_string(docs_dir.join("summary.md")).unwrap(),
            "the summary"
        );

        // First request offers the tool schemas, the follow-up does not.
        assert!(!backend.request(0).tools.is_empty());
        assert!(backend.request(1).tools.is_empty());

        // The follow-up saw the assistant's call and the tool result.
        let follow_up = backend.request(1);
        let tool_turn = follow_up
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert_eq!(tool_turn.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn unknown_capability_aborts_without_corrupting_the_conversation() {
        let backend = ScriptedBackend::new(vec![Ok(CompletionResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_x".into(),
                name: "delete_everything".into(),
                arguments: json!({}),
            }],
        })]);
        let mut bot = bot_with(backend.clone(), fast_params());

        let result = bot.chat("do something").await;
        match result {
            Err(Error::UnresolvedCapability { name }) => assert_eq!(name, "delete_everything"),
            other => panic!("expected UnresolvedCapability, got {other:?}"),
        }
        assert_eq!(bot.conversation().len(), 1);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn history_stays_capped_across_many_exchanges() {
        let backend = ScriptedBackend::new(
            (0..3)
                .map(|n| Ok(CompletionResponse::text(format!("answer {n}"))))
                .collect(),
        );
        let mut bot = bot_with(backend.clone(), fast_params());

        for n in 0..3 {
            bot.chat(&format!("question {n}")).await.unwrap();
        }
        let messages = bot.conversation().messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[2].text(), "question 2");
        assert_eq!(messages[3].text(), "answer 2");
    }
}
