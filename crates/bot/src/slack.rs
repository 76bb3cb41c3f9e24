//! Slack Web API client and Events API payload types
//!
//! Covers the four calls the bot needs: thread fetch, reply post, reply
//! update, channel/user lookups. Event delivery arrives as HTTP callbacks
//! handled in `main`.

use common::{BotError, ThreadContext, ThreadMessage};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

const SLACK_API_BASE: &str = "https://slack.com/api";

// --- Inbound Events API payloads ---

/// Top-level Events API callback body
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    UrlVerification { challenge: String },
    EventCallback { event: CallbackEvent },
    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    AppMention(AppMentionEvent),
    #[serde(other)]
    Other,
}

/// A mention of the bot inside a channel or thread
#[derive(Debug, Clone, Deserialize)]
pub struct AppMentionEvent {
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    /// Present only when the mention happened inside a thread
    #[serde(default)]
    pub thread_ts: Option<String>,
}

// --- Web API response envelopes ---

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    ts: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    ok: bool,
    #[serde(default)]
    user: Option<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfoResponse {
    ok: bool,
    #[serde(default)]
    channel: Option<ChannelInfo>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    #[serde(default)]
    name: Option<String>,
}

/// Slack Web API client
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    mention_re: Regex,
}

impl SlackClient {
    pub fn new(client: reqwest::Client, token: String) -> Self {
        Self {
            client,
            token,
            mention_re: Regex::new(r"<@[A-Z0-9]+>").unwrap(),
        }
    }

    /// Permalink to the thread root, e.g.
    /// `https://slack.com/archives/C024BE91L/p1714000000000100`
    pub fn permalink(channel: &str, thread_ts: &str) -> String {
        format!(
            "https://slack.com/archives/{}/p{}",
            channel,
            thread_ts.replace('.', "")
        )
    }

    /// Remove `<@U…>` mention tags (the bot's own mention included) so they
    /// don't leak into the transcript
    pub fn strip_mentions(&self, text: &str) -> String {
        self.mention_re.replace_all(text, "").trim().to_string()
    }

    /// Fetch the full thread and map it into a `ThreadContext`: bot
    /// messages are dropped, mention tags stripped, author names resolved
    /// through a per-invocation cache.
    pub async fn fetch_thread(
        &self,
        channel: &str,
        thread_ts: &str,
    ) -> Result<ThreadContext, BotError> {
        let response = self
            .client
            .get(format!("{}/conversations.replies", SLACK_API_BASE))
            .bearer_auth(&self.token)
            .query(&[("channel", channel), ("ts", thread_ts)])
            .send()
            .await
            .map_err(|e| BotError::Fetch(format!("conversations.replies failed: {}", e)))?
            .json::<RepliesResponse>()
            .await
            .map_err(|e| BotError::Fetch(format!("conversations.replies response: {}", e)))?;

        if !response.ok {
            return Err(BotError::Fetch(format!(
                "conversations.replies error: {}",
                response.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        let mut name_cache: HashMap<String, String> = HashMap::new();
        let mut messages = Vec::new();
        for raw in response.messages {
            // Skip the bot's own replies
            if raw.bot_id.is_some() {
                continue;
            }
            let Some(user_id) = raw.user else {
                continue;
            };
            let author = self.user_name(&user_id, &mut name_cache).await;
            messages.push(ThreadMessage {
                author,
                text: self.strip_mentions(&raw.text),
                ts: raw.ts,
            });
        }

        Ok(ThreadContext::new(messages))
    }

    /// Resolve a user ID to a display name, falling back to "User <id>"
    async fn user_name(&self, user_id: &str, cache: &mut HashMap<String, String>) -> String {
        if let Some(name) = cache.get(user_id) {
            return name.clone();
        }

        let resolved = match self
            .client
            .get(format!("{}/users.info", SLACK_API_BASE))
            .bearer_auth(&self.token)
            .query(&[("user", user_id)])
            .send()
            .await
        {
            Ok(r) => r.json::<UserInfoResponse>().await.ok(),
            Err(_) => None,
        };

        let name = match resolved {
            Some(response) if response.ok => response
                .user
                .and_then(|u| u.real_name.or(u.name))
                .unwrap_or_else(|| format!("User {}", user_id)),
            _ => {
                warn!("Failed to resolve user {}", user_id);
                format!("User {}", user_id)
            }
        };

        cache.insert(user_id.to_string(), name.clone());
        name
    }

    /// Resolve a channel ID to a human-readable name. DMs and group DMs
    /// have no name; unknown types fall back to the raw ID.
    pub async fn channel_name(&self, channel_id: &str) -> String {
        if channel_id.starts_with('D') {
            return "direct-message".to_string();
        }
        if channel_id.starts_with('G') {
            return "group-message".to_string();
        }

        let response = self
            .client
            .get(format!("{}/conversations.info", SLACK_API_BASE))
            .bearer_auth(&self.token)
            .query(&[("channel", channel_id)])
            .send()
            .await;

        match response {
            Ok(r) => match r.json::<ChannelInfoResponse>().await {
                Ok(info) if info.ok => info
                    .channel
                    .and_then(|c| c.name)
                    .unwrap_or_else(|| format!("channel-{}", channel_id)),
                _ => {
                    warn!("Failed to resolve channel {}", channel_id);
                    format!("channel-{}", channel_id)
                }
            },
            Err(e) => {
                warn!("conversations.info failed for {}: {}", channel_id, e);
                format!("channel-{}", channel_id)
            }
        }
    }

    /// Post a message; inside a thread when `thread_ts` is given.
    /// Returns the new message's timestamp (needed for later updates).
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<String, BotError> {
        let mut body = json!({ "channel": channel, "text": text });
        if let Some(ts) = thread_ts {
            body["thread_ts"] = json!(ts);
        }

        let response = self
            .client
            .post(format!("{}/chat.postMessage", SLACK_API_BASE))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Post(format!("chat.postMessage failed: {}", e)))?
            .json::<PostMessageResponse>()
            .await
            .map_err(|e| BotError::Post(format!("chat.postMessage response: {}", e)))?;

        if !response.ok {
            return Err(BotError::Post(format!(
                "chat.postMessage error: {}",
                response.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        response
            .ts
            .ok_or_else(|| BotError::Post("chat.postMessage returned no ts".to_string()))
    }

    /// Replace the text of an already-posted message
    pub async fn update_message(
        &self,
        channel: &str,
        ts: &str,
        text: &str,
    ) -> Result<(), BotError> {
        let body = json!({ "channel": channel, "ts": ts, "text": text });

        let response = self
            .client
            .post(format!("{}/chat.update", SLACK_API_BASE))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Post(format!("chat.update failed: {}", e)))?
            .json::<UpdateResponse>()
            .await
            .map_err(|e| BotError::Post(format!("chat.update response: {}", e)))?;

        if !response.ok {
            return Err(BotError::Post(format!(
                "chat.update error: {}",
                response.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        Ok(())
    }
}
