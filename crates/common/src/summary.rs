//! Summary formatting - prompt rendering and structured response parsing
//!
//! The model is asked to answer in a fixed sectioned shape (TITLE / POINTS /
//! KEYWORDS) so the response can be parsed back into typed fields without a
//! second extraction call.

use crate::error::BotError;
use crate::llm::Prompt;
use crate::thread::ThreadContext;
use serde::{Deserialize, Serialize};

const TITLE_MARKER: &str = "TITLE:";
const POINTS_MARKER: &str = "POINTS:";
const KEYWORDS_MARKER: &str = "KEYWORDS:";

const SYSTEM_PROMPT: &str = "\
You summarize Slack thread conversations.

Analyze the thread transcript the user provides and respond using exactly \
this structure, with no other sections:

TITLE: <a short one-line title for the discussion>

POINTS:
- <key point, at most five>

KEYWORDS: <up to ten important keywords (project names, technical terms), comma-separated>

Keep the summary concise while covering every important point, decision and \
open question from the thread. Attribute decisions and action items to the \
people who made them.";

/// Structured summary of one thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub bullets: Vec<String>,
    pub keywords: Vec<String>,
    pub participants: Vec<String>,
}

/// Serialize the thread into a prompt: chronological transcript as
/// `author: text` blocks plus the fixed instruction block.
pub fn render_prompt(thread: &ThreadContext) -> Prompt {
    let transcript: Vec<String> = thread
        .messages()
        .iter()
        .filter(|m| !m.text.trim().is_empty())
        .map(|m| format!("{}: {}", m.author, m.text))
        .collect();

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: transcript.join("\n\n"),
    }
}

/// Parse the model's sectioned response back into a `Summary`.
/// The participant set is copied from the thread context. A missing section
/// marker fails the whole parse; no partial summaries.
pub fn parse_response(raw: &str, thread: &ThreadContext) -> Result<Summary, BotError> {
    let mut title: Option<String> = None;
    let mut bullets: Option<Vec<String>> = None;
    let mut keywords: Option<Vec<String>> = None;
    let mut in_points = false;

    // First occurrence of each marker wins
    for line in raw.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(TITLE_MARKER) {
            if title.is_none() {
                title = Some(rest.trim().to_string());
            }
            in_points = false;
        } else if trimmed.starts_with(POINTS_MARKER) {
            if bullets.is_none() {
                bullets = Some(Vec::new());
                in_points = true;
            }
        } else if let Some(rest) = trimmed.strip_prefix(KEYWORDS_MARKER) {
            if keywords.is_none() {
                // Verbatim keywords, no deduplication
                keywords = Some(
                    rest.split(',')
                        .map(|k| k.trim().to_string())
                        .filter(|k| !k.is_empty())
                        .collect(),
                );
            }
            in_points = false;
        } else if in_points {
            if let Some(rest) = trimmed.strip_prefix("- ") {
                if let Some(points) = bullets.as_mut() {
                    points.push(rest.trim().to_string());
                }
            }
        }
    }

    let title = title.ok_or_else(|| BotError::Parse("response is missing the TITLE section".to_string()))?;
    let bullets =
        bullets.ok_or_else(|| BotError::Parse("response is missing the POINTS section".to_string()))?;
    let keywords = keywords
        .ok_or_else(|| BotError::Parse("response is missing the KEYWORDS section".to_string()))?;

    if title.is_empty() {
        return Err(BotError::Parse("response TITLE section is empty".to_string()));
    }

    Ok(Summary {
        title,
        bullets,
        keywords,
        participants: thread.participants(),
    })
}
