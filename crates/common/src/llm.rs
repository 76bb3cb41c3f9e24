//! LLM client adapters for the two supported backends
//!
//! Both clients expose the same `complete(&Prompt) -> String` surface;
//! `LlmService` selects one per call by matching on `Provider`.

use crate::error::BotError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Claude,
    AzureOpenai,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::AzureOpenai => "azure_openai",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(Provider::Claude),
            "azure_openai" => Ok(Provider::AzureOpenai),
            other => Err(BotError::Config(format!(
                "unknown LLM provider '{}' (expected 'claude' or 'azure_openai')",
                other
            ))),
        }
    }
}

/// System/user prompt pair built by the summary formatter
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

// --- Claude (Anthropic messages API) ---

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Claude client (HTTP direct, no SDK)
#[derive(Debug, Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(client: reqwest::Client, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            client,
            api_key,
            model,
            max_tokens,
        }
    }

    pub async fn complete(&self, prompt: &Prompt) -> Result<String, BotError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: prompt.system.clone(),
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.user.clone(),
            }],
        };

        debug!("Sending Claude request (model: {})", self.model);

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Llm(format!("Claude request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Claude API error {}: {}", status, body);
            return Err(BotError::Llm(format!("Claude API error: {}", status)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| BotError::Llm(format!("Failed to read Claude response: {}", e)))?;

        debug!("Claude raw response: {}", response_text);

        let parsed: ClaudeResponse = serde_json::from_str(&response_text)
            .map_err(|e| BotError::Llm(format!("Failed to parse Claude response: {}", e)))?;

        extract_claude_text(parsed)
    }
}

fn extract_claude_text(response: ClaudeResponse) -> Result<String, BotError> {
    response
        .content
        .into_iter()
        .find(|block| block.content_type == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| BotError::Llm("Claude response contained no text block".to_string()))
}

// --- Azure OpenAI (chat completions API) ---

#[derive(Debug, Serialize)]
struct AzureRequest {
    messages: Vec<AzureMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct AzureMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AzureResponse {
    choices: Vec<AzureChoice>,
}

#[derive(Debug, Deserialize)]
struct AzureChoice {
    message: AzureResponseMessage,
}

#[derive(Debug, Deserialize)]
struct AzureResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Azure OpenAI client.
/// Azure differs from plain OpenAI: the deployment name is part of the URL,
/// the API version is a query parameter, and auth uses an `api-key` header.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    deployment: String,
    api_version: String,
    max_tokens: u32,
}

impl AzureOpenAiClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        endpoint: String,
        deployment: String,
        api_version: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            deployment,
            api_version,
            max_tokens,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }

    pub async fn complete(&self, prompt: &Prompt) -> Result<String, BotError> {
        let request = AzureRequest {
            messages: vec![
                AzureMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                AzureMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        debug!("Sending Azure OpenAI request (deployment: {})", self.deployment);

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Llm(format!("Azure OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Azure OpenAI API error {}: {}", status, body);
            return Err(BotError::Llm(format!("Azure OpenAI API error: {}", status)));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| BotError::Llm(format!("Failed to read Azure OpenAI response: {}", e)))?;

        debug!("Azure OpenAI raw response: {}", response_text);

        let parsed: AzureResponse = serde_json::from_str(&response_text)
            .map_err(|e| BotError::Llm(format!("Failed to parse Azure OpenAI response: {}", e)))?;

        extract_azure_text(parsed)
    }
}

fn extract_azure_text(response: AzureResponse) -> Result<String, BotError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BotError::Llm("Azure OpenAI response contained no message content".to_string()))
}

// --- Tagged dispatch over the configured backends ---

/// Holds one optional client per provider; selection happens per call.
/// An unconfigured provider surfaces a configuration error at first use.
#[derive(Debug, Clone, Default)]
pub struct LlmService {
    claude: Option<ClaudeClient>,
    azure: Option<AzureOpenAiClient>,
}

impl LlmService {
    pub fn new(claude: Option<ClaudeClient>, azure: Option<AzureOpenAiClient>) -> Self {
        Self { claude, azure }
    }

    /// Whether the given provider has a configured client
    pub fn supports(&self, provider: Provider) -> bool {
        match provider {
            Provider::Claude => self.claude.is_some(),
            Provider::AzureOpenai => self.azure.is_some(),
        }
    }

    pub async fn generate(&self, provider: Provider, prompt: &Prompt) -> Result<String, BotError> {
        match provider {
            Provider::Claude => match &self.claude {
                Some(client) => client.complete(prompt).await,
                None => Err(BotError::Config(
                    "Claude is not configured (set TSB_ANTHROPIC_API_KEY)".to_string(),
                )),
            },
            Provider::AzureOpenai => match &self.azure {
                Some(client) => client.complete(prompt).await,
                None => Err(BotError::Config(
                    "Azure OpenAI is not configured (set TSB_AZURE_OPENAI_API_KEY and TSB_AZURE_OPENAI_ENDPOINT)"
                        .to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_provider_parsing() {
        assert_eq!(Provider::from_str("claude").unwrap(), Provider::Claude);
        assert_eq!(Provider::from_str("CLAUDE").unwrap(), Provider::Claude);
        assert_eq!(
            Provider::from_str("azure_openai").unwrap(),
            Provider::AzureOpenai
        );
        assert!(Provider::from_str("openai").is_err());
    }

    #[test]
    fn test_provider_display_roundtrip() {
        for provider in [Provider::Claude, Provider::AzureOpenai] {
            assert_eq!(
                Provider::from_str(&provider.to_string()).unwrap(),
                provider
            );
        }
    }

    #[test]
    fn test_azure_url_assembly() {
        let client = AzureOpenAiClient::new(
            reqwest::Client::new(),
            "key".to_string(),
            "https://my-resource.openai.azure.com/".to_string(),
            "gpt-4".to_string(),
            "2023-12-01-preview".to_string(),
            1000,
        );
        assert_eq!(
            client.url(),
            "https://my-resource.openai.azure.com/openai/deployments/gpt-4/chat/completions?api-version=2023-12-01-preview"
        );
    }

    #[test]
    fn test_claude_text_extraction() {
        let response: ClaudeResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "summary here"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_claude_text(response).unwrap(), "summary here");
    }

    #[test]
    fn test_claude_missing_text_block_is_llm_error() {
        let response: ClaudeResponse =
            serde_json::from_str(r#"{"content": [{"type": "tool_use"}]}"#).unwrap();
        assert!(matches!(
            extract_claude_text(response),
            Err(BotError::Llm(_))
        ));
    }

    #[test]
    fn test_azure_text_extraction() {
        let response: AzureResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "summary here"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_azure_text(response).unwrap(), "summary here");
    }

    #[test]
    fn test_azure_empty_choices_is_llm_error() {
        let response: AzureResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(extract_azure_text(response), Err(BotError::Llm(_))));
    }

    #[test]
    fn test_unconfigured_provider_is_config_error() {
        let service = LlmService::default();
        assert!(!service.supports(Provider::Claude));
        assert!(!service.supports(Provider::AzureOpenai));
    }
}
