//! Threadsum - Summarizes Slack threads on mention
//!
//! Responsibilities:
//! - Receives Slack Events API callbacks over HTTP
//! - Summarizes the mentioned thread with the selected LLM backend
//! - Replies in-thread, optionally persisting the summary to Notion

mod command;
mod config;
mod dispatch;
mod notion;
mod slack;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use common::{AzureOpenAiClient, ClaudeClient, LlmService};
use config::BotConfig;
use dispatch::Bot;
use notion::NotionClient;
use slack::{CallbackEvent, EventPayload, SlackClient};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = BotConfig::parse();
    let default_provider = config.validate()?;

    info!("Threadsum starting");
    info!("  HTTP: {}:{}", config.http_host, config.http_port);
    info!("  Default provider: {}", default_provider);
    info!(
        "  Notion persistence: {}",
        if config.notion_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );

    if config.notion_api_key.is_some() != config.notion_database_id.is_some() {
        warn!(
            "Notion is only partially configured (both TSB_NOTION_API_KEY and \
             TSB_NOTION_DATABASE_ID are required); persistence stays disabled"
        );
    }

    // One HTTP client with the bounded timeout, shared by every collaborator
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let claude = config.anthropic_api_key.clone().map(|key| {
        ClaudeClient::new(
            http.clone(),
            key,
            config.claude_model.clone(),
            config.llm_max_tokens,
        )
    });
    let azure = match (
        config.azure_openai_api_key.clone(),
        config.azure_openai_endpoint.clone(),
    ) {
        (Some(key), Some(endpoint)) => Some(AzureOpenAiClient::new(
            http.clone(),
            key,
            endpoint,
            config.azure_openai_deployment.clone(),
            config.azure_openai_api_version.clone(),
            config.llm_max_tokens,
        )),
        _ => None,
    };
    let notion = match (
        config.notion_api_key.clone(),
        config.notion_database_id.clone(),
    ) {
        (Some(key), Some(database_id)) => Some(NotionClient::new(http.clone(), key, database_id)),
        _ => None,
    };

    let bot = Arc::new(Bot {
        slack: SlackClient::new(http, config.slack_bot_token.clone()),
        llm: LlmService::new(claude, azure),
        notion,
        default_provider,
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/slack/events", post(slack_events))
        .with_state(bot);

    let addr = format!("{}:{}", config.http_host, config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Threadsum OK"
}

/// Slack Events API callback: answer the URL verification challenge and
/// acknowledge events immediately; mentions are handled in their own task.
async fn slack_events(
    State(bot): State<Arc<Bot>>,
    Json(payload): Json<EventPayload>,
) -> Json<serde_json::Value> {
    match payload {
        EventPayload::UrlVerification { challenge } => {
            Json(serde_json::json!({ "challenge": challenge }))
        }
        EventPayload::EventCallback { event } => {
            if let CallbackEvent::AppMention(mention) = event {
                let bot = Arc::clone(&bot);
                tokio::spawn(async move {
                    bot.handle_mention(mention).await;
                });
            }
            Json(serde_json::json!({ "ok": true }))
        }
        EventPayload::Other => Json(serde_json::json!({ "ok": true })),
    }
}
