//! Token-bounded input chunking.
//!
//! Oversized input is split into ordered chunks whose token counts fit the
//! per-request limit. Decoded chunks concatenate back to the original input.
//! Multi-part sends are annotated with a part header, and non-final parts
//! carry a footer asking the model to hold its answer — a prompting
//! convention only; the orchestrator accepts whatever each part gets back.

use anyhow::{ensure, Result};

use crate::tokens::Tokenizer;

/// A contiguous token slice of one oversized input, decoded back to text.
/// Ephemeral: created per call and consumed immediately.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based position within the split.
    pub index: usize,
    /// Total number of chunks produced from the input.
    pub total: usize,
    /// The decoded slice, without annotations.
    pub text: String,
}

impl Chunk {
    pub fn is_final(&self) -> bool {
        self.index + 1 == self.total
    }

    /// The text actually sent as the user turn. Single chunks go verbatim;
    /// parts of a multi-chunk send get a position header, and non-final
    /// parts ask the model to wait for the rest.
    pub fn prompt_text(&self) -> String {
        if self.total == 1 {
            return self.text.clone();
        }
        let mut prompt = format!("[part {}/{}]\n{}", self.index + 1, self.total, self.text);
        if !self.is_final() {
            prompt.push_str(
                "\n[more parts follow -- acknowledge briefly and hold your full \
answer until the final part]",
            );
        }
        prompt
    }
}

/// Splits `text` into chunks of at most `limit` tokens each, in input order.
///
/// Inputs at or under the limit yield exactly one chunk equal to the input.
/// Otherwise the chunk count is `ceil(total_tokens / limit)` and the decoded
/// chunk texts concatenate to the original input.
pub fn split(tokenizer: &Tokenizer, text: &str, limit: usize) -> Result<Vec<Chunk>> {
    ensure!(limit > 0, "chunk token limit must be positive");

    let tokens = tokenizer.encode(text);
    if tokens.len() <= limit {
        return Ok(vec![Chunk {
            index: 0,
            total: 1,
            text: text.to_string(),
        }]);
    }

    let total = tokens.len().div_ceil(limit);
    let mut chunks = Vec::with_capacity(total);
    for (index, slice) in tokens.chunks(limit).enumerate() {
        chunks.push(Chunk {
            index,
            total,
            text: tokenizer.decode(slice)?,
        });
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::for_model(crate::constants::DEFAULT_MODEL).unwrap()
    }

    #[test]
    fn input_under_limit_is_a_single_identity_chunk() {
        let tok = tokenizer();
        let chunks = split(&tok, "Hello", 50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hello");
        assert_eq!(chunks[0].prompt_text(), "Hello");
        assert!(chunks[0].is_final());
    }

    #[test]
    fn decoded_chunks_concatenate_to_the_input() {
        let tok = tokenizer();
        let text = "one two three four five six seven eight nine ten ".repeat(40);
        let chunks = split(&tok, &text, 16).unwrap();
        assert!(chunks.len() > 1);
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunk_count_is_ceil_of_tokens_over_limit() {
        let tok = tokenizer();
        let text = "alpha beta gamma delta ".repeat(30);
        let total_tokens = tok.count(&text);
        let limit = 16;
        let chunks = split(&tok, &text, limit).unwrap();
        assert_eq!(chunks.len(), total_tokens.div_ceil(limit));
        for chunk in &chunks {
            assert!(tok.count(&chunk.text) <= limit);
            assert_eq!(chunk.total, chunks.len());
        }
    }

    #[test]
    fn parts_are_annotated_and_final_part_has_no_hold_footer() {
        let tok = tokenizer();
        let text = "word ".repeat(100);
        let chunks = split(&tok, &text, 16).unwrap();
        let first = chunks.first().unwrap().prompt_text();
        let last = chunks.last().unwrap().prompt_text();
        assert!(first.starts_with("[part 1/"));
        assert!(first.contains("hold your full"));
        assert!(last.starts_with(&format!("[part {}/{}]", chunks.len(), chunks.len())));
        assert!(!last.contains("hold your full"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let tok = tokenizer();
        assert!(split(&tok, "hi", 0).is_err());
    }
}
