//! Error types for Threadsum components

/// Common errors across Threadsum components
#[derive(Debug, Clone)]
pub enum BotError {
    /// Missing or invalid configuration (fatal at startup or at first use)
    Config(String),
    /// Thread, channel or user lookup against the Slack API failed
    Fetch(String),
    /// LLM call failed (network, HTTP status, or response envelope)
    Llm(String),
    /// LLM response did not contain the expected sections
    Parse(String),
    /// Notion write failed
    Persist(String),
    /// Posting or updating a Slack message failed
    Post(String),
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BotError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            BotError::Llm(msg) => write!(f, "LLM error: {}", msg),
            BotError::Parse(msg) => write!(f, "Parse error: {}", msg),
            BotError::Persist(msg) => write!(f, "Persist error: {}", msg),
            BotError::Post(msg) => write!(f, "Post error: {}", msg),
        }
    }
}

impl std::error::Error for BotError {}
