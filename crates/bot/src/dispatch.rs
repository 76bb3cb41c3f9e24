//! End-to-end invocation pipeline
//!
//! One `app_mention` event drives one linear pass: parse options, post a
//! placeholder reply, fetch the thread, call the selected LLM backend, parse
//! the structured response, update the placeholder, optionally persist to
//! Notion and report the outcome in a follow-up message. Every failure is
//! converted into a user-visible thread message; nothing propagates out.

use crate::command::RequestConfig;
use crate::notion::{NotionClient, PageMeta};
use crate::slack::{AppMentionEvent, SlackClient};
use common::{parse_response, render_prompt, BotError, LlmService, Provider, Summary};
use std::time::Instant;
use tracing::{error, info};

const NOTHING_TO_SUMMARIZE: &str = "There is nothing to summarize in this thread yet.";
const FETCH_FAILED: &str = "Sorry, I couldn't read this thread's messages. Please try again.";
const SUMMARY_FAILED: &str =
    "Sorry, I couldn't generate a summary for this thread. Please try again.";
const PERSIST_FAILED: &str = ":warning: The summary could not be saved to Notion.";
const NOTION_NOT_CONFIGURED: &str = ":warning: Notion persistence is not configured for this bot.";

/// Immutable per-process state shared by all invocations
pub struct Bot {
    pub slack: SlackClient,
    pub llm: LlmService,
    pub notion: Option<NotionClient>,
    pub default_provider: Provider,
}

impl Bot {
    /// Handle one mention event end to end
    pub async fn handle_mention(&self, event: AppMentionEvent) {
        let started = Instant::now();

        let Some(thread_ts) = event.thread_ts.clone() else {
            // Mention outside a thread: explain usage instead of summarizing
            if let Err(e) = self
                .slack
                .post_message(&event.channel, &self.usage_text(), None)
                .await
            {
                error!("Failed to post usage message: {}", e);
            }
            return;
        };

        let request = RequestConfig::parse(&event.text, self.default_provider);
        info!(
            "Summary request: channel={}, thread={}, user={}, provider={}, persist={}",
            event.channel, thread_ts, event.user, request.provider, request.persist
        );

        let placeholder = if request.persist {
            "Summarizing this thread…\nThe summary will also be saved to Notion."
        } else {
            "Summarizing this thread…"
        };
        let processing_ts = match self
            .slack
            .post_message(&event.channel, placeholder, Some(&thread_ts))
            .await
        {
            Ok(ts) => ts,
            Err(e) => {
                error!("Failed to post placeholder reply: {}", e);
                return;
            }
        };

        match self
            .summarize(&event.channel, &thread_ts, request.provider)
            .await
        {
            Ok(summary) => {
                let reply = render_reply(&summary, request.provider);
                if let Err(e) = self
                    .slack
                    .update_message(&event.channel, &processing_ts, &reply)
                    .await
                {
                    // The user never saw a summary, so don't persist one
                    error!("Failed to post summary reply: {}", e);
                    return;
                }

                if request.persist {
                    let notice = self.persist(&summary, &event.channel, &thread_ts).await;
                    if let Err(e) = self
                        .slack
                        .post_message(&event.channel, &notice, Some(&thread_ts))
                        .await
                    {
                        error!("Failed to post persistence notice: {}", e);
                    }
                }

                info!(
                    "Summary request completed in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
            }
            Err(user_text) => {
                if let Err(e) = self
                    .slack
                    .update_message(&event.channel, &processing_ts, &user_text)
                    .await
                {
                    error!("Failed to post failure notice: {}", e);
                }
            }
        }
    }

    /// Fetch, prompt, generate, parse. Returns the user-visible failure
    /// text on error; the LLM is never called for an empty thread.
    async fn summarize(
        &self,
        channel: &str,
        thread_ts: &str,
        provider: Provider,
    ) -> Result<Summary, String> {
        let thread = match self.slack.fetch_thread(channel, thread_ts).await {
            Ok(thread) => thread,
            Err(e) => {
                error!("Thread fetch failed: {}", e);
                return Err(FETCH_FAILED.to_string());
            }
        };

        if !thread.has_content() {
            info!("Thread {} has no summarizable content", thread_ts);
            return Err(NOTHING_TO_SUMMARIZE.to_string());
        }
        info!("Fetched {} thread messages", thread.len());

        let prompt = render_prompt(&thread);
        let raw = match self.llm.generate(provider, &prompt).await {
            Ok(raw) => raw,
            Err(BotError::Config(msg)) => {
                error!("Requested provider unavailable: {}", msg);
                return Err(format!(
                    "The {} backend is not configured for this bot.",
                    provider
                ));
            }
            Err(e) => {
                error!("LLM call failed: {}", e);
                return Err(SUMMARY_FAILED.to_string());
            }
        };

        // A malformed response reads like any other LLM failure to the user
        match parse_response(&raw, &thread) {
            Ok(summary) => Ok(summary),
            Err(e) => {
                error!("Response parse failed: {}", e);
                Err(SUMMARY_FAILED.to_string())
            }
        }
    }

    /// Persist the summary and return the user-visible outcome notice
    async fn persist(&self, summary: &Summary, channel: &str, thread_ts: &str) -> String {
        let Some(notion) = &self.notion else {
            return NOTION_NOT_CONFIGURED.to_string();
        };

        let channel_name = self.slack.channel_name(channel).await;
        let meta = PageMeta::new(
            channel_name,
            SlackClient::permalink(channel, thread_ts),
            thread_ts,
        );

        match notion.create_page(summary, &meta).await {
            Ok(url) => {
                info!("Summary saved to Notion: {}", url);
                format!(":memo: Saved to Notion: {}", url)
            }
            Err(e) => {
                error!("Notion persist failed: {}", e);
                PERSIST_FAILED.to_string()
            }
        }
    }

    fn usage_text(&self) -> String {
        format!(
            "Mention me inside a thread and I'll summarize it.\n\
             Options:\n\
             • `notion` - also save the summary to Notion\n\
             • `use_claude` - use the Claude backend\n\
             • `use_azure` - use the Azure OpenAI backend\n\
             \n\
             Current default provider: *{}*",
            self.default_provider
        )
    }
}

/// Render the summary as a Slack-formatted threaded reply
pub fn render_reply(summary: &Summary, provider: Provider) -> String {
    let mut out = format!("*{}*\n", summary.title);
    for bullet in &summary.bullets {
        out.push_str(&format!("• {}\n", bullet));
    }
    if !summary.keywords.is_empty() {
        out.push_str(&format!("\n*Keywords:* {}\n", summary.keywords.join(", ")));
    }
    if !summary.participants.is_empty() {
        out.push_str(&format!(
            "*Participants:* {}\n",
            summary.participants.join(", ")
        ));
    }
    out.push_str(&format!("\n_Generated by: {}_", provider));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> Summary {
        Summary {
            title: "Friday release plan".to_string(),
            bullets: vec!["Ship friday".to_string(), "Migration first".to_string()],
            keywords: vec!["release".to_string(), "migration".to_string()],
            participants: vec!["alice".to_string(), "bob".to_string()],
        }
    }

    #[test]
    fn test_reply_contains_all_sections_in_order() {
        let reply = render_reply(&summary(), Provider::Claude);
        let title_pos = reply.find("*Friday release plan*").unwrap();
        let first = reply.find("Ship friday").unwrap();
        let second = reply.find("Migration first").unwrap();
        assert!(title_pos < first && first < second);
        assert!(reply.contains("*Keywords:* release, migration"));
        assert!(reply.contains("*Participants:* alice, bob"));
    }

    #[test]
    fn test_reply_footer_names_the_provider() {
        assert!(render_reply(&summary(), Provider::Claude).ends_with("_Generated by: claude_"));
        assert!(render_reply(&summary(), Provider::AzureOpenai)
            .ends_with("_Generated by: azure_openai_"));
    }

    #[test]
    fn test_reply_omits_empty_keyword_section() {
        let mut s = summary();
        s.keywords.clear();
        assert!(!render_reply(&s, Provider::Claude).contains("*Keywords:*"));
    }
}
