//! Notion create-page client - maps a finished summary to one database record

use chrono::Utc;
use common::{BotError, Summary};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

const NOTION_API_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

// Notion rejects multi-select option names longer than 100 characters
const MAX_SELECT_NAME_LEN: usize = 100;

/// Source-thread details the record carries besides the summary itself
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub channel_name: String,
    pub thread_url: String,
    /// YYYY-MM-DD derived from the thread root timestamp
    pub thread_date: String,
    /// YYYY-MM-DD of the write
    pub saved_date: String,
}

impl PageMeta {
    pub fn new(channel_name: String, thread_url: String, thread_ts: &str) -> Self {
        let saved_date = Utc::now().format("%Y-%m-%d").to_string();
        let thread_date = ts_to_date(thread_ts).unwrap_or_else(|| saved_date.clone());
        Self {
            channel_name,
            thread_url,
            thread_date,
            saved_date,
        }
    }
}

/// Convert a Slack timestamp ("1714000000.000100") to a YYYY-MM-DD date
fn ts_to_date(ts: &str) -> Option<String> {
    let secs: i64 = ts.split('.').next()?.parse().ok()?;
    let date = chrono::DateTime::<Utc>::from_timestamp(secs, 0)?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn select_option(name: &str) -> Value {
    json!({ "name": name.chars().take(MAX_SELECT_NAME_LEN).collect::<String>() })
}

/// Build the create-page payload: database properties plus body blocks
/// (source link, "Key points" heading, one bulleted item per finding)
fn build_page_payload(database_id: &str, summary: &Summary, meta: &PageMeta) -> Value {
    let mut properties = json!({
        "Title": {
            "title": [{ "text": { "content": &summary.title } }]
        },
        "Channel": {
            "rich_text": [{ "text": { "content": format!("#{}", meta.channel_name) } }]
        },
        "Saved": {
            "date": { "start": &meta.saved_date }
        },
        "Thread date": {
            "date": { "start": &meta.thread_date }
        },
        "Thread URL": {
            "url": &meta.thread_url
        }
    });

    if !summary.keywords.is_empty() {
        properties["Keywords"] = json!({
            "multi_select": summary.keywords.iter().map(|k| select_option(k)).collect::<Vec<_>>()
        });
    }
    if !summary.participants.is_empty() {
        properties["Participants"] = json!({
            "multi_select": summary.participants.iter().map(|p| select_option(p)).collect::<Vec<_>>()
        });
    }

    let mut children = vec![
        json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{
                    "type": "text",
                    "text": { "content": format!("Source thread: {}", meta.thread_url) },
                    "annotations": { "bold": true }
                }]
            }
        }),
        json!({
            "object": "block",
            "type": "heading_2",
            "heading_2": {
                "rich_text": [{ "type": "text", "text": { "content": "Key points" } }]
            }
        }),
    ];
    for bullet in &summary.bullets {
        children.push(json!({
            "object": "block",
            "type": "bulleted_list_item",
            "bulleted_list_item": {
                "rich_text": [{ "type": "text", "text": { "content": bullet } }]
            }
        }));
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": properties,
        "children": children
    })
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    url: String,
}

/// Notion client - one create call per persisted summary
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    api_key: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(client: reqwest::Client, api_key: String, database_id: String) -> Self {
        Self {
            client,
            api_key,
            database_id,
        }
    }

    /// Create the record and return the new page's URL
    pub async fn create_page(&self, summary: &Summary, meta: &PageMeta) -> Result<String, BotError> {
        let payload = build_page_payload(&self.database_id, summary, meta);

        debug!("Creating Notion page in database {}", self.database_id);

        let response = self
            .client
            .post(NOTION_API_URL)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::Persist(format!("Notion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Notion API error {}: {}", status, body);
            return Err(BotError::Persist(format!("Notion API error: {}", status)));
        }

        let created: CreatedPage = response
            .json()
            .await
            .map_err(|e| BotError::Persist(format!("Failed to parse Notion response: {}", e)))?;

        Ok(created.url)
    }
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

    fn meta() -> PageMeta {
        PageMeta {
            channel_name: "engineering".to_string(),
            thread_url: "https://slack.com/archives/C1/p1714000000000100".to_string(),
            thread_date: "2024-04-24".to_string(),
            saved_date: "2024-04-25".to_string(),
        }
    }

    #[test]
    fn test_ts_to_date() {
        assert_eq!(ts_to_date("1714000000.000100").unwrap(), "2024-04-24");
        assert!(ts_to_date("not-a-ts").is_none());
    }

    #[test]
    fn test_payload_properties() {
        let payload = build_page_payload("db-1", &summary(), &meta());

        assert_eq!(payload["parent"]["database_id"], "db-1");
        assert_eq!(
            payload["properties"]["Title"]["title"][0]["text"]["content"],
            "Friday release plan"
        );
        assert_eq!(
            payload["properties"]["Channel"]["rich_text"][0]["text"]["content"],
            "#engineering"
        );
        assert_eq!(payload["properties"]["Thread date"]["date"]["start"], "2024-04-24");
        assert_eq!(
            payload["properties"]["Keywords"]["multi_select"][1]["name"],
            "migration"
        );
        assert_eq!(
            payload["properties"]["Participants"]["multi_select"][0]["name"],
            "alice"
        );
    }

    #[test]
    fn test_payload_body_blocks() {
        let payload = build_page_payload("db-1", &summary(), &meta());
        let children = payload["children"].as_array().unwrap();

        // link paragraph + heading + one item per bullet
        assert_eq!(children.len(), 4);
        assert_eq!(children[0]["type"], "paragraph");
        assert_eq!(children[1]["type"], "heading_2");
        assert_eq!(
            children[2]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "Ship friday"
        );
        assert_eq!(
            children[3]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
            "Migration first"
        );
    }

    #[test]
    fn test_select_option_names_truncated() {
        let long = "x".repeat(250);
        let option = select_option(&long);
        assert_eq!(option["name"].as_str().unwrap().len(), MAX_SELECT_NAME_LEN);
    }

    #[test]
    fn test_empty_keywords_omit_property() {
        let mut s = summary();
        s.keywords.clear();
        let payload = build_page_payload("db-1", &s, &meta());
        assert!(payload["properties"].get("Keywords").is_none());
    }
}
