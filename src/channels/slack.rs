//! Slack channel adapter
//!
//! Socket Mode: `apps.connections.open` hands out a WebSocket URL, Slack
//! pushes event envelopes over it, and every envelope is acked with its
//! `envelope_id` before the event is processed. Each `app_mention` spawns
//! an independent engine task bracketed by a "thinking" reaction; replies
//! go out through `chat.postMessage`.

use crate::config::SlackConfig;
use crate::engine::{Engine, MentionEvent};
use crate::error::{Error, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const SLACK_API: &str = "https://slack.com/api";

/// Delay before reconnecting after the socket drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// The bot's own identity, fetched once at startup via `auth.test` and
/// passed into the event loop as a plain value.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub user_id: String,
}

/// Slack Web API client.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    app_token: String,
    thinking_emoji: String,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token: config.bot_token.clone(),
            app_token: config.app_token.clone(),
            thinking_emoji: config.thinking_emoji.clone(),
        }
    }

    async fn api_post(&self, token: &str, method: &str, payload: &Value) -> Result<Value> {
        let response = self
            .http
            .post(format!("{SLACK_API}/{method}"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Channel(format!("{method} request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Channel(format!("{method} decode failed: {e}")))?;

        if body["ok"].as_bool() != Some(true) {
            let err = body["error"].as_str().unwrap_or("unknown");
            return Err(Error::Channel(format!("{method} error: {err}")));
        }

        Ok(body)
    }

    /// Fetch the bot's user ID. Run once at startup.
    pub async fn auth_test(&self) -> Result<BotIdentity> {
        let response = self.api_post(&self.bot_token, "auth.test", &json!({})).await?;
        let user_id = response["user_id"]
            .as_str()
            .ok_or_else(|| Error::Channel("auth.test returned no user_id".to_string()))?
            .to_string();

        tracing::info!(user_id = %user_id, "Authenticated with Slack");
        Ok(BotIdentity { user_id })
    }

    /// Open a fresh Socket Mode WebSocket URL.
    async fn open_socket_url(&self) -> Result<String> {
        let response = self
            .api_post(&self.app_token, "apps.connections.open", &json!({}))
            .await?;

        response["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Channel("apps.connections.open returned no url".to_string())
            })
    }

    /// Post a reply into a channel.
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        let payload = json!({ "channel": channel_id, "text": text });
        self.api_post(&self.bot_token, "chat.postMessage", &payload)
            .await?;
        Ok(())
    }

    /// Add the "thinking" reaction to the mention being processed.
    pub async fn add_thinking(&self, channel_id: &str, ts: &str) -> Result<()> {
        let payload = json!({
            "name": self.thinking_emoji,
            "channel": channel_id,
            "timestamp": ts,
        });
        self.api_post(&self.bot_token, "reactions.add", &payload)
            .await?;
        Ok(())
    }

    /// Remove the "thinking" reaction again.
    pub async fn remove_thinking(&self, channel_id: &str, ts: &str) -> Result<()> {
        let payload = json!({
            "name": self.thinking_emoji,
            "channel": channel_id,
            "timestamp": ts,
        });
        self.api_post(&self.bot_token, "reactions.remove", &payload)
            .await?;
        Ok(())
    }
}

/// Run the Socket Mode event loop until the task is cancelled.
///
/// The socket is reopened with a fresh URL whenever Slack disconnects it.
/// Every parsed mention spawns its own task, so a burst of mentions runs
/// as concurrent pipelines.
pub async fn run_socket_mode(
    client: Arc<SlackClient>,
    engine: Arc<Engine>,
    identity: BotIdentity,
) -> Result<()> {
    loop {
        let url = client.open_socket_url().await?;
        tracing::info!("Connecting to Slack Socket Mode");

        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::Channel(format!("websocket connect failed: {e}")))?;
        let (mut write, mut read) = stream.split();

        while let Some(message) = read.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "Socket read error, reconnecting");
                    break;
                }
            };

            match message {
                Message::Text(text) => {
                    let envelope: Value = match serde_json::from_str(&text) {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::warn!(error = %e, "Unparseable envelope, skipping");
                            continue;
                        }
                    };

                    // Ack first; Slack redelivers unacked envelopes.
                    if let Some(envelope_id) = envelope["envelope_id"].as_str() {
                        let ack = ack_frame(envelope_id);
                        if write.send(Message::Text(ack)).await.is_err() {
                            tracing::warn!("Ack send failed, reconnecting");
                            break;
                        }
                    }

                    match envelope["type"].as_str() {
                        Some("hello") => {
                            tracing::info!("Slack Socket Mode connected");
                        }
                        Some("disconnect") => {
                            tracing::info!("Slack requested disconnect, reconnecting");
                            break;
                        }
                        Some("events_api") => {
                            if let Some(event) = parse_mention(&envelope, &identity.user_id) {
                                spawn_mention_task(client.clone(), engine.clone(), event);
                            }
                        }
                        _ => {}
                    }
                }
                Message::Ping(payload) => {
                    if write.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Socket closed by Slack, reconnecting");
                    break;
                }
                _ => {}
            }
        }

        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// One mention, one task: reaction on, engine, reply, reaction off.
fn spawn_mention_task(client: Arc<SlackClient>, engine: Arc<Engine>, event: MentionEvent) {
    tokio::spawn(async move {
        tracing::info!(
            user_id = %event.user_id,
            channel_id = %event.channel_id,
            "Handling mention"
        );

        if let Err(e) = client.add_thinking(&event.channel_id, &event.ts).await {
            tracing::debug!(error = %e, "Failed to add reaction");
        }

        let reply = engine.handle_mention(&event).await;

        if let Err(e) = client.post_message(&event.channel_id, &reply).await {
            tracing::error!(error = %e, "Failed to post reply");
        }

        if let Err(e) = client.remove_thinking(&event.channel_id, &event.ts).await {
            tracing::debug!(error = %e, "Failed to remove reaction");
        }
    });
}

fn ack_frame(envelope_id: &str) -> String {
    json!({ "envelope_id": envelope_id }).to_string()
}

/// Parse an `events_api` envelope into a mention, stripping the bot's own
/// mention from the text. Non-mention events and the bot's own messages
/// yield `None`.
fn parse_mention(envelope: &Value, bot_user_id: &str) -> Option<MentionEvent> {
    let event = &envelope["payload"]["event"];
    if event["type"].as_str() != Some("app_mention") {
        return None;
    }
    if event["bot_id"].is_string() {
        return None;
    }

    let user_id = event["user"].as_str()?.to_string();
    let channel_id = event["channel"].as_str()?.to_string();
    let ts = event["ts"].as_str()?.to_string();
    let raw_text = event["text"].as_str().unwrap_or("");

    Some(MentionEvent {
        user_id,
        channel_id,
        ts,
        text: strip_bot_mention(raw_text, bot_user_id),
    })
}

fn strip_bot_mention(text: &str, bot_user_id: &str) -> String {
    text.replace(&format!("<@{bot_user_id}>"), "")
        .trim()
        .to_string()
}
