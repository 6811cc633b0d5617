//! Token counting and encoding for glitch.
//!
//! Uses tiktoken-rs for accurate BPE tokenization. For OpenAI models, the
//! exact tokenizer is used; for unknown models, cl100k_base (GPT-4 family)
//! serves as a reasonable approximation. Encoding and decoding are
//! deterministic and side-effect-free, so the chunker can slice token
//! sequences and reassemble the original text.

use anyhow::{anyhow, Result};
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::message::Message;

/// A single BPE token id.
pub type TokenId = u32;

/// Model-aware BPE tokenizer.
pub struct Tokenizer {
    bpe: CoreBPE,
}

impl Tokenizer {
    /// Builds a tokenizer for `model`, falling back to cl100k_base for
    /// models tiktoken does not know about.
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = get_bpe_from_model(model).or_else(|_| tiktoken_rs::cl100k_base())?;
        Ok(Self { bpe })
    }

    /// Encodes text into token ids.
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        self.bpe.encode_ordinary(text)
    }

    /// Decodes token ids back into text.
    ///
    /// Reverses [`encode`](Self::encode) exactly as long as the slice starts
    /// and ends on token boundaries of the original encoding.
    pub fn decode(&self, tokens: &[TokenId]) -> Result<String> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| anyhow!("token decode failed: {e}"))
    }

    /// Counts tokens in a text string.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Counts tokens across all turns of a conversation.
    /// Each turn carries ~4 tokens of overhead for role markers.
    pub fn count_conversation(&self, messages: &[Message]) -> usize {
        let mut total = crate::constants::TOKENS_CONVERSATION_FRAMING;
        for msg in messages {
            total += crate::constants::TOKENS_PER_MESSAGE_OVERHEAD;
            total += self.count(msg.text());
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let tokenizer = Tokenizer::for_model("gpt-4o").unwrap();
        let text = "The quick brown fox jumps over the lazy dog.";
        let tokens = tokenizer.encode(text);
        assert!(!tokens.is_empty());
        assert_eq!(tokenizer.decode(&tokens).unwrap(), text);
    }

    #[test]
    fn unknown_model_falls_back() {
        let tokenizer = Tokenizer::for_model("some-unknown-model").unwrap();
        assert!(tokenizer.count("hello world") > 0);
    }

    #[test]
    fn conversation_count_includes_overhead() {
        let tokenizer = Tokenizer::for_model("gpt-4o").unwrap();
        let messages = vec![Message::system("sys"), Message::user("hello")];
        let content = tokenizer.count("sys") + tokenizer.count("hello");
        let expected = content
            + 2 * crate::constants::TOKENS_PER_MESSAGE_OVERHEAD
            + crate::constants::TOKENS_CONVERSATION_FRAMING;
        assert_eq!(tokenizer.count_conversation(&messages), expected);
    }
}
