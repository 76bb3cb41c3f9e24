//! Bot configuration

use clap::Parser;
use common::{BotError, Provider};
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "bot")]
#[command(about = "Threadsum Bot - Summarizes Slack threads on mention")]
pub struct BotConfig {
    /// Slack bot token (xoxb-...)
    #[arg(long, env = "TSB_SLACK_BOT_TOKEN")]
    pub slack_bot_token: String,

    /// Bind host for the Slack events webhook
    #[arg(long, env = "TSB_HTTP_HOST", default_value = "0.0.0.0")]
    pub http_host: String,

    /// Bind port for the Slack events webhook
    #[arg(long, env = "TSB_HTTP_PORT", default_value = "3000")]
    pub http_port: u16,

    /// Default LLM provider ("claude" or "azure_openai")
    #[arg(long, env = "TSB_LLM_PROVIDER", default_value = "claude")]
    pub llm_provider: String,

    /// Anthropic API key (required when the Claude provider is used)
    #[arg(long, env = "TSB_ANTHROPIC_API_KEY")]
    pub anthropic_api_key: Option<String>,

    /// Claude model to use
    #[arg(long, env = "TSB_CLAUDE_MODEL", default_value = "claude-3-haiku-20240307")]
    pub claude_model: String,

    /// Azure OpenAI API key
    #[arg(long, env = "TSB_AZURE_OPENAI_API_KEY")]
    pub azure_openai_api_key: Option<String>,

    /// Azure OpenAI resource endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long, env = "TSB_AZURE_OPENAI_ENDPOINT")]
    pub azure_openai_endpoint: Option<String>,

    /// Azure OpenAI deployment name
    #[arg(long, env = "TSB_AZURE_OPENAI_DEPLOYMENT", default_value = "gpt-4")]
    pub azure_openai_deployment: String,

    /// Azure OpenAI API version
    #[arg(
        long,
        env = "TSB_AZURE_OPENAI_API_VERSION",
        default_value = "2023-12-01-preview"
    )]
    pub azure_openai_api_version: String,

    /// Notion integration token (enables the `notion` trigger option)
    #[arg(long, env = "TSB_NOTION_API_KEY")]
    pub notion_api_key: Option<String>,

    /// Notion database the summaries are written to
    #[arg(long, env = "TSB_NOTION_DATABASE_ID")]
    pub notion_database_id: Option<String>,

    /// Token budget for LLM completions
    #[arg(long, env = "TSB_LLM_MAX_TOKENS", default_value = "1000")]
    pub llm_max_tokens: u32,

    /// Timeout for outbound HTTP calls in seconds
    #[arg(long, env = "TSB_HTTP_TIMEOUT_SECS", default_value = "30")]
    pub http_timeout_secs: u64,
}

impl BotConfig {
    /// Fail fast when the default provider selection is invalid or its
    /// credentials are missing. The other provider and Notion are only
    /// checked at first use.
    pub fn validate(&self) -> Result<Provider, BotError> {
        let provider = Provider::from_str(&self.llm_provider)?;
        match provider {
            Provider::Claude if self.anthropic_api_key.is_none() => Err(BotError::Config(
                "default provider is claude but TSB_ANTHROPIC_API_KEY is not set".to_string(),
            )),
            Provider::AzureOpenai
                if self.azure_openai_api_key.is_none() || self.azure_openai_endpoint.is_none() =>
            {
                Err(BotError::Config(
                    "default provider is azure_openai but TSB_AZURE_OPENAI_API_KEY or TSB_AZURE_OPENAI_ENDPOINT is not set"
                        .to_string(),
                ))
            }
            _ => Ok(provider),
        }
    }

    /// Both Notion settings are present
    pub fn notion_enabled(&self) -> bool {
        self.notion_api_key.is_some() && self.notion_database_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> BotConfig {
        BotConfig {
            slack_bot_token: "xoxb-test".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 3000,
            llm_provider: "claude".to_string(),
            anthropic_api_key: Some("sk-ant".to_string()),
            claude_model: "claude-3-haiku-20240307".to_string(),
            azure_openai_api_key: None,
            azure_openai_endpoint: None,
            azure_openai_deployment: "gpt-4".to_string(),
            azure_openai_api_version: "2023-12-01-preview".to_string(),
            notion_api_key: None,
            notion_database_id: None,
            llm_max_tokens: 1000,
            http_timeout_secs: 30,
        }
    }

    #[test]
    fn test_validate_claude_default() {
        assert_eq!(base_config().validate().unwrap(), Provider::Claude);
    }

    #[test]
    fn test_validate_fails_without_default_provider_key() {
        let mut config = base_config();
        config.anthropic_api_key = None;
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn test_validate_azure_default_needs_key_and_endpoint() {
        let mut config = base_config();
        config.llm_provider = "azure_openai".to_string();
        config.azure_openai_api_key = Some("key".to_string());
        assert!(matches!(config.validate(), Err(BotError::Config(_))));

        config.azure_openai_endpoint = Some("https://r.openai.azure.com".to_string());
        assert_eq!(config.validate().unwrap(), Provider::AzureOpenai);
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = base_config();
        config.llm_provider = "gemini".to_string();
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn test_notion_enabled_requires_both_settings() {
        let mut config = base_config();
        assert!(!config.notion_enabled());
        config.notion_api_key = Some("secret".to_string());
        assert!(!config.notion_enabled());
        config.notion_database_id = Some("db".to_string());
        assert!(config.notion_enabled());
    }
}
