//! Notion persistence
//!
//! Saved links become pages in a Notion database with a fixed schema:
//! Name (title), Date Created (date), Label Tags (multi-select), URL Link
//! (url), Summary (rich text). The database is found or created once under
//! the configured parent page at startup; after that only `create_entry`
//! runs. The database is the source of truth — entries are not retained in
//! memory after submission.

use crate::config::NotionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::time::Duration;

const NOTION_API: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// One link on its way into the database. Transient; dropped after the
/// persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub title: String,
    pub date: NaiveDate,
    pub labels: Vec<String>,
    pub url: String,
    pub summary: String,
}

/// Persistence seam for saved links, injected into the ingestion pipeline.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn create_entry(&self, entry: &LinkEntry) -> Result<()>;
}

/// Notion REST client.
pub struct NotionClient {
    http: reqwest::Client,
    api_key: String,
    database_id: String,
}

impl NotionClient {
    /// Connect and resolve the links database: search for one with the
    /// configured title under the parent page, create it when absent.
    pub async fn connect(config: &NotionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut client = Self {
            http,
            api_key: config.api_key.clone(),
            database_id: String::new(),
        };

        client.database_id = match client
            .find_database(&config.database_title, &config.parent_page_id)
            .await?
        {
            Some(id) => {
                tracing::info!(database_id = %id, "Found existing links database");
                id
            }
            None => {
                let id = client
                    .create_database(&config.database_title, &config.parent_page_id)
                    .await?;
                tracing::info!(database_id = %id, "Created links database");
                id
            }
        };

        Ok(client)
    }

    async fn api_post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .http
            .post(format!("{NOTION_API}{path}"))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("notion {path} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Persistence(format!(
                "notion {path} returned status {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("notion {path} decode failed: {e}")))
    }

    /// Search for a database by title directly under the parent page.
    async fn find_database(&self, title: &str, parent_page_id: &str) -> Result<Option<String>> {
        let body = json!({
            "query": title,
            "filter": { "value": "database", "property": "object" },
        });
        let response = self.api_post("/search", &body).await?;

        let normalized_parent = normalize_id(parent_page_id);
        let results = response["results"].as_array().cloned().unwrap_or_default();

        for result in results {
            let parent = result["parent"]["page_id"].as_str().unwrap_or("");
            if normalize_id(parent) != normalized_parent {
                continue;
            }
            let found_title = result["title"][0]["plain_text"].as_str().unwrap_or("");
            if found_title == title {
                if let Some(id) = result["id"].as_str() {
                    return Ok(Some(id.to_string()));
                }
            }
        }

        Ok(None)
    }

    async fn create_database(&self, title: &str, parent_page_id: &str) -> Result<String> {
        let body = database_create_body(title, parent_page_id);
        let response = self.api_post("/databases", &body).await?;

        response["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Persistence("created database has no id".to_string()))
    }
}

#[async_trait]
impl LinkStore for NotionClient {
    async fn create_entry(&self, entry: &LinkEntry) -> Result<()> {
        let body = page_create_body(&self.database_id, entry);
        self.api_post("/pages", &body).await?;

        tracing::info!(title = %entry.title, url = %entry.url, "Entry added to Notion");
        Ok(())
    }
}

/// Notion IDs appear both dashed and undashed; compare without dashes.
fn normalize_id(id: &str) -> String {
    id.replace('-', "")
}

fn database_create_body(title: &str, parent_page_id: &str) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": parent_page_id },
        "title": [ { "type": "text", "text": { "content": title } } ],
        "is_inline": false,
        "properties": {
            "Name": { "title": {} },
            "Date Created": { "date": {} },
            "Label Tags": { "multi_select": {} },
            "URL Link": { "url": {} },
            "Summary": { "rich_text": {} },
        },
    })
}

fn page_create_body(database_id: &str, entry: &LinkEntry) -> Value {
    let labels: Vec<Value> = entry
        .labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(|label| json!({ "name": label }))
        .collect();

    json!({
        "parent": { "type": "database_id", "database_id": database_id },
        "properties": {
            "Name": {
                "title": [ { "text": { "content": entry.title } } ],
            },
            "Date Created": {
                "date": { "start": entry.date.format("%Y-%m-%d").to_string() },
            },
            "Label Tags": { "multi_select": labels },
            "URL Link": { "url": entry.url },
            "Summary": {
                "rich_text": [ { "text": { "content": entry.summary } } ],
            },
        },
    })
}
