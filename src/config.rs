//! StashBot configuration management
//!
//! Configuration is read from a TOML file when one is given, then credential
//! fields are overridden from the environment so tokens never have to live
//! in the file. Missing required credentials are a startup error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main StashBot configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StashbotConfig {
    /// Slack channel configuration
    #[serde(default)]
    pub slack: SlackConfig,

    /// Notion persistence configuration
    #[serde(default)]
    pub notion: NotionConfig,

    /// Language-model configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Label vocabulary configuration
    #[serde(default)]
    pub labels: LabelsConfig,

    /// Conversation history configuration
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Slack channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`), normally from `SLACK_BOT_TOKEN`
    pub bot_token: String,

    /// App-level token (`xapp-...`) for Socket Mode, normally from
    /// `SLACK_APP_TOKEN`
    pub app_token: String,

    /// Reaction emoji shown while a mention is being processed
    pub thinking_emoji: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            app_token: String::new(),
            thinking_emoji: "one-sec-cooking".to_string(),
        }
    }
}

/// Notion persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration API key, normally from `NOTION_API_KEY`
    pub api_key: String,

    /// Parent page the links database lives under, normally from
    /// `NOTION_PARENT_PAGE_ID`
    pub parent_page_id: String,

    /// Title of the links database (found or created under the parent page)
    pub database_title: String,

    /// Request timeout in seconds for all Notion calls
    pub timeout_secs: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            parent_page_id: String::new(),
            database_title: "Saved Links".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Language-model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ollama endpoint base URL
    pub endpoint: String,

    /// Model identity, fixed for the process lifetime
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
        }
    }
}

/// Label vocabulary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// File the vocabulary is persisted to, one label per line
    pub file: PathBuf,

    /// Maximum number of model-suggested labels per link
    pub max_suggestions: usize,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("logs/labels.txt"),
            max_suggestions: 3,
        }
    }
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Persona message seeding every transcript
    pub persona: String,

    /// Cap on retained user/bot turns per transcript; `None` keeps the
    /// transcript unbounded
    pub max_turns: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            persona: "You are StashBot, a helpful Slack assistant. \
                      Answer questions concisely and conversationally."
                .to_string(),
            max_turns: None,
        }
    }
}

impl StashbotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("invalid config file: {e}")))
    }

    /// Override credential fields from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Override credential fields through an arbitrary lookup.
    ///
    /// Split out from [`apply_env`](Self::apply_env) so tests don't have to
    /// mutate the process environment.
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("SLACK_BOT_TOKEN") {
            self.slack.bot_token = v;
        }
        if let Some(v) = get("SLACK_APP_TOKEN") {
            self.slack.app_token = v;
        }
        if let Some(v) = get("NOTION_API_KEY") {
            self.notion.api_key = v;
        }
        if let Some(v) = get("NOTION_PARENT_PAGE_ID") {
            self.notion.parent_page_id = v;
        }
        if let Some(v) = get("OLLAMA_HOST") {
            self.model.endpoint = v;
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.model.model = v;
        }
    }

    /// Check that everything required to start the bot is present.
    pub fn validate(&self) -> Result<()> {
        if self.slack.bot_token.is_empty() {
            return Err(Error::Config("SLACK_BOT_TOKEN is not set".to_string()));
        }
        if self.slack.app_token.is_empty() {
            return Err(Error::Config("SLACK_APP_TOKEN is not set".to_string()));
        }
        if self.notion.api_key.is_empty() {
            return Err(Error::Config("NOTION_API_KEY is not set".to_string()));
        }
        if self.notion.parent_page_id.is_empty() {
            return Err(Error::Config(
                "NOTION_PARENT_PAGE_ID is not set".to_string(),
            ));
        }
        Ok(())
    }
}
