//! Append-only conversation transcripts.
//!
//! Each conversation gets its own plain-text file under the transcripts
//! directory, keyed by conversation id, so concurrent sessions never
//! interleave writes. Every completed exchange is appended as two lines
//! (user, bot) plus a blank separator, flushed immediately.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

/// Writer for one conversation's audit log.
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    /// Creates the transcript file for `conversation_id`, with a header line
    /// recording when the conversation started.
    pub fn create(dir: PathBuf, conversation_id: &str) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create transcript directory {}", dir.display()))?;
        let path = dir.join(format!("{conversation_id}.txt"));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open transcript {}", path.display()))?;
        writeln!(
            file,
            "# conversation {} started {}",
            conversation_id,
            Utc::now().to_rfc3339()
        )?;
        writeln!(file)?;
        Ok(Self { path })
    }

    /// Appends one completed exchange.
    pub fn append(&self, user_input: &str, response: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open transcript {}", self.path.display()))?;
        writeln!(file, "User: {user_input}")?;
        writeln!(file, "{}: {response}", crate::constants::BOT_NAME)?;
        writeln!(file)?;
        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchanges_are_appended_in_order() {
        let dir = std::env::temp_dir().join(format!("glitch-transcript-{}", uuid::Uuid::new_v4()));
        let transcript = Transcript::create(dir, "abc123").unwrap();
        transcript.append("hello", "hi there").unwrap();
        transcript.append("second", "reply").unwrap();

        let text = std::fs::read_to_string(transcript.path()).unwrap();
        assert!(text.starts_with("# conversation abc123 started "));
        let user_pos = text.find("User: hello").unwrap();
        let bot_pos = text.find("glitch: hi there").unwrap();
        let second_pos = text.find("User: second").unwrap();
        assert!(user_pos < bot_pos && bot_pos < second_pos);
        assert!(text.contains("glitch: reply\n"));
    }
}
