//! Common types and utilities shared across Threadsum components
//!
//! This crate contains:
//! - Thread context types for one fetched conversation
//! - Shared errors
//! - LLM client adapters (Claude, Azure OpenAI) behind the `llm` feature
//! - Summary prompt rendering and structured response parsing

pub mod error;
#[cfg(feature = "llm")]
pub mod llm;
#[cfg(feature = "llm")]
pub mod summary;
pub mod thread;

// Re-export commonly used types
pub use error::BotError;
#[cfg(feature = "llm")]
pub use llm::{AzureOpenAiClient, ClaudeClient, LlmService, Prompt, Provider};
#[cfg(feature = "llm")]
pub use summary::{parse_response, render_prompt, Summary};
pub use thread::{ThreadContext, ThreadMessage};
