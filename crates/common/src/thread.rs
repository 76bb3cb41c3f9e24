//! Thread context types - one fetched conversation thread per invocation

use serde::{Deserialize, Serialize};

/// One message inside a thread, with the bot mention tags already stripped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Author display name
    pub author: String,
    /// Message text (may be empty after mention stripping)
    pub text: String,
    /// Slack timestamp, e.g. "1714000000.000100"
    pub ts: String,
}

/// Ordered messages of a single thread, immutable once fetched
#[derive(Debug, Clone, Default)]
pub struct ThreadContext {
    messages: Vec<ThreadMessage>,
}

impl ThreadContext {
    /// Create a context from chronologically ordered messages
    pub fn new(messages: Vec<ThreadMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[ThreadMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether the thread contains anything worth summarizing.
    /// Messages whose text became empty after mention stripping don't count.
    pub fn has_content(&self) -> bool {
        self.messages.iter().any(|m| !m.text.trim().is_empty())
    }

    /// Distinct participant names in first-post order.
    /// Every author counts, including ones whose only message carried no
    /// text beyond the bot mention.
    pub fn participants(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for msg in &self.messages {
            if !seen.contains(&msg.author) {
                seen.push(msg.author.clone());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(author: &str, text: &str, ts: &str) -> ThreadMessage {
        ThreadMessage {
            author: author.to_string(),
            text: text.to_string(),
            ts: ts.to_string(),
        }
    }

    #[test]
    fn test_participants_distinct_in_first_post_order() {
        let thread = ThreadContext::new(vec![
            msg("alice", "hello", "1.0"),
            msg("bob", "hi", "2.0"),
            msg("alice", "more", "3.0"),
            msg("carol", "", "4.0"),
        ]);
        assert_eq!(thread.participants(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_empty_thread_has_no_content() {
        let thread = ThreadContext::new(vec![]);
        assert!(thread.is_empty());
        assert!(!thread.has_content());
    }

    #[test]
    fn test_mention_only_messages_do_not_count_as_content() {
        // A trigger message reduced to whitespace after mention stripping
        let thread = ThreadContext::new(vec![msg("alice", "  ", "1.0")]);
        assert!(!thread.is_empty());
        assert!(!thread.has_content());
    }
}
