//! Trigger-message option parsing

use common::Provider;
use std::collections::HashSet;

const NOTION_TOKEN: &str = "notion";
const CLAUDE_TOKEN: &str = "use_claude";
const AZURE_TOKEN: &str = "use_azure";

/// Per-invocation request configuration derived once from the trigger text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    pub provider: Provider,
    pub persist: bool,
}

impl RequestConfig {
    /// Tokens are whitespace-separated, case-insensitive and
    /// order-independent; unrecognized tokens are ignored. When both
    /// provider tokens appear, claude wins.
    pub fn parse(text: &str, default_provider: Provider) -> Self {
        let lowered = text.to_lowercase();
        let tokens: HashSet<&str> = lowered.split_whitespace().collect();

        let provider = if tokens.contains(CLAUDE_TOKEN) {
            Provider::Claude
        } else if tokens.contains(AZURE_TOKEN) {
            Provider::AzureOpenai
        } else {
            default_provider
        };

        Self {
            provider,
            persist: tokens.contains(NOTION_TOKEN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notion_token_any_position_and_case() {
        for text in [
            "<@U123> notion",
            "<@U123> NOTION use_azure",
            "notion <@U123>",
        ] {
            assert!(RequestConfig::parse(text, Provider::Claude).persist);
        }
        assert!(!RequestConfig::parse("<@U123> summarize", Provider::Claude).persist);
    }

    #[test]
    fn test_provider_token_selects_provider() {
        assert_eq!(
            RequestConfig::parse("<@U123> use_claude", Provider::AzureOpenai).provider,
            Provider::Claude
        );
        assert_eq!(
            RequestConfig::parse("<@U123> USE_AZURE", Provider::Claude).provider,
            Provider::AzureOpenai
        );
    }

    #[test]
    fn test_no_provider_token_uses_default() {
        assert_eq!(
            RequestConfig::parse("<@U123> notion", Provider::AzureOpenai).provider,
            Provider::AzureOpenai
        );
    }

    #[test]
    fn test_both_provider_tokens_claude_wins_regardless_of_order() {
        for text in ["<@U123> use_claude use_azure", "<@U123> use_azure use_claude"] {
            assert_eq!(
                RequestConfig::parse(text, Provider::AzureOpenai).provider,
                Provider::Claude
            );
        }
    }

    #[test]
    fn test_unrecognized_tokens_are_ignored() {
        let request = RequestConfig::parse("<@U123> please summarize asap", Provider::Claude);
        assert_eq!(request.provider, Provider::Claude);
        assert!(!request.persist);
    }

    #[test]
    fn test_end_to_end_trigger_text() {
        let request = RequestConfig::parse("<@U123> use_claude notion", Provider::AzureOpenai);
        assert_eq!(request.provider, Provider::Claude);
        assert!(request.persist);
    }
}
