//! Bounded conversation store.
//!
//! Holds the ordered turn sequence for one chat session. The system turn at
//! index 0 is pinned for the life of the conversation; everything else is
//! subject to two eviction paths:
//!
//! - [`Conversation::trim_to_token_budget`] drops the oldest non-system turn
//!   (index 1) until the encoded conversation fits a token budget.
//! - [`Conversation::evict_oldest_pair`] runs after each completed exchange
//!   and removes at index 2 until the length cap is restored, keeping the
//!   system turn, one older lead-in turn, and the most recent exchange.

use crate::message::Message;
use crate::tokens::Tokenizer;

/// Ordered sequence of turns; insertion order is chronological.
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation seeded with the system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Appends a turn to the end. Never fails.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Rolls back to a prior length, discarding newer turns. The system turn
    /// is never discarded.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }

    /// Removes the oldest non-system turn (index 1) while the encoded
    /// conversation exceeds `max_tokens` and more than a system turn and one
    /// exchange turn remain. Returns the number of turns removed.
    ///
    /// The system turn and the most recent turn always survive, so a single
    /// oversized turn cannot empty the conversation. Idempotent once under
    /// budget.
    pub fn trim_to_token_budget(&mut self, tokenizer: &Tokenizer, max_tokens: usize) -> usize {
        let mut removed = 0;
        while self.messages.len() > 2 && tokenizer.count_conversation(&self.messages) > max_tokens {
            self.messages.remove(1);
            removed += 1;
        }
        removed
    }

    /// Restores the length cap after a completed exchange by removing at
    /// index 2 until at most [`MAX_HISTORY_MESSAGES`] turns remain (twice per
    /// full user/assistant pair). Index 1 survives as a stable lead-in.
    /// Returns the number of turns removed.
    ///
    /// [`MAX_HISTORY_MESSAGES`]: crate::constants::MAX_HISTORY_MESSAGES
    pub fn evict_oldest_pair(&mut self) -> usize {
        let mut removed = 0;
        while self.messages.len() > crate::constants::MAX_HISTORY_MESSAGES {
            self.messages.remove(2);
            removed += 1;
        }
        removed
    }

    /// The system turn the conversation was seeded with.
    pub fn system_turn(&self) -> &Message {
        &self.messages[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    fn tokenizer() -> Tokenizer {
        Tokenizer::for_model(crate::constants::DEFAULT_MODEL).unwrap()
    }

    fn exchange(conv: &mut Conversation, n: usize) {
        conv.append(Message::user(format!("question {n}")));
        conv.append(Message::assistant(format!("answer {n}")));
    }

    #[test]
    fn system_turn_survives_trimming() {
        let tok = tokenizer();
        let mut conv = Conversation::new("system prompt");
        for n in 0..10 {
            exchange(&mut conv, n);
        }
        conv.trim_to_token_budget(&tok, 1);
        assert_eq!(conv.system_turn().role, Role::System);
        assert_eq!(conv.system_turn().text(), "system prompt");
    }

    #[test]
    fn trim_never_removes_most_recent_turn() {
        let tok = tokenizer();
        let mut conv = Conversation::new("s");
        for n in 0..5 {
            exchange(&mut conv, n);
        }
        conv.trim_to_token_budget(&tok, 1);
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.messages().last().unwrap().text(), "answer 4");
    }

    #[test]
    fn trim_is_idempotent() {
        let tok = tokenizer();
        let mut conv = Conversation::new("s");
        for n in 0..6 {
            exchange(&mut conv, n);
        }
        let budget = 60;
        conv.trim_to_token_budget(&tok, budget);
        let after_once: Vec<String> =
            conv.messages().iter().map(|m| m.text().to_string()).collect();
        let removed_again = conv.trim_to_token_budget(&tok, budget);
        let after_twice: Vec<String> =
            conv.messages().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(removed_again, 0);
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn trim_under_budget_is_a_no_op() {
        let tok = tokenizer();
        let mut conv = Conversation::new("s");
        exchange(&mut conv, 0);
        assert_eq!(conv.trim_to_token_budget(&tok, 100_000), 0);
        assert_eq!(conv.len(), 3);
    }

    #[test]
    fn eviction_caps_length_after_three_exchanges() {
        let mut conv = Conversation::new("s");
        for n in 0..3 {
            exchange(&mut conv, n);
            conv.evict_oldest_pair();
        }
        // Six appended turns collapse to the cap: system, the retained
        // lead-in, and the latest exchange.
        assert_eq!(conv.len(), 4);
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.messages()[2].text(), "question 2");
        assert_eq!(conv.messages()[3].text(), "answer 2");
    }

    #[test]
    fn eviction_is_a_no_op_at_or_under_cap() {
        let mut conv = Conversation::new("s");
        exchange(&mut conv, 0);
        assert_eq!(conv.evict_oldest_pair(), 0);
        assert_eq!(conv.len(), 3);
    }

    #[test]
    fn truncate_rolls_back_but_keeps_system() {
        let mut conv = Conversation::new("s");
        exchange(&mut conv, 0);
        conv.truncate(1);
        assert_eq!(conv.len(), 1);
        conv.truncate(0);
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.system_turn().role, Role::System);
    }
}
