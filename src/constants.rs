//! Centralized constants for glitch.
//!
//! All magic numbers, default strings, and configuration constants live here
//! so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "glitch";

/// Name the assistant goes by in REPL output and transcripts.
pub const BOT_NAME: &str = "glitch";

/// Default LLM model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default system prompt seeding every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are glitch, a helpful AI assistant in the terminal. \
Be concise. When the user sends code or documents, work with exactly what \
was provided.";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

/// Diagnostics log filename.
pub const DIAGNOSTICS_FILENAME: &str = "glitch.log";

/// Directory (under the data dir) holding per-conversation transcripts.
pub const TRANSCRIPTS_DIRNAME: &str = "transcripts";

/// Directory (under the data dir) where `save_document` writes files.
pub const DOCUMENTS_DIRNAME: &str = "documents";

// --- Completion request defaults ---

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.75;

/// Default frequency penalty.
pub const DEFAULT_FREQUENCY_PENALTY: f32 = 0.2;

/// Default presence penalty.
pub const DEFAULT_PRESENCE_PENALTY: f32 = 0.0;

/// Default base URL for the chat-completions API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// --- Conversation bounds ---

/// Maximum conversation length (entries, including the system turn) enforced
/// after each completed exchange.
pub const MAX_HISTORY_MESSAGES: usize = 4;

/// Default token budget for the conversation sent with each request.
pub const DEFAULT_HISTORY_TOKEN_BUDGET: usize = 8_192;

/// Default per-request token limit above which input is chunked.
pub const DEFAULT_CHUNK_TOKEN_LIMIT: usize = 2_048;

// --- Token counting ---

/// Approximate token overhead per message (role markers, etc.).
pub const TOKENS_PER_MESSAGE_OVERHEAD: usize = 4;

/// Approximate token overhead for conversation framing.
pub const TOKENS_CONVERSATION_FRAMING: usize = 2;

// --- Retry defaults ---

/// Default attempt cap for the retry wrapper.
pub const RETRY_MAX_ATTEMPTS: usize = 5;

/// Initial backoff delay in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 100;

/// Backoff multiplier applied after each transient failure.
pub const RETRY_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Ceiling on a single backoff delay in milliseconds.
pub const RETRY_MAX_DELAY_MS: u64 = 30_000;

// --- REPL ---

/// Words that terminate the interactive loop (matched case-insensitively).
pub const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Keyword marking a list of file or directory paths to ingest.
pub const FILES_KEYWORD: &str = "files:";
