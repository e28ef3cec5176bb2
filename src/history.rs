//! Per-user conversation state
//!
//! Each user gets an ordered transcript seeded with the system persona turn
//! on first access. The rendered transcript, joined as `User:` / `Bot:`
//! lines with the persona first, is the entire memory mechanism passed to
//! the model. Growth is unbounded unless a `max_turns` cap is configured.

use std::collections::HashMap;
use tokio::sync::RwLock;

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Bot,
}

/// One transcript turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    fn line(&self) -> String {
        match self.role {
            // The persona already reads as an instruction; no prefix.
            Role::System => self.text.clone(),
            Role::User => format!("User: {}", self.text),
            Role::Bot => format!("Bot: {}", self.text),
        }
    }
}

/// Per-user transcript store.
pub struct ConversationStore {
    persona: String,
    max_turns: Option<usize>,
    transcripts: RwLock<HashMap<String, Vec<Turn>>>,
}

impl ConversationStore {
    /// Create a store seeding new transcripts with `persona`. `max_turns`
    /// caps retained user/bot turns per transcript; `None` is unbounded.
    pub fn new(persona: impl Into<String>, max_turns: Option<usize>) -> Self {
        Self {
            persona: persona.into(),
            max_turns,
            transcripts: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of a user's transcript, seeding it on first access.
    pub async fn transcript(&self, user_id: &str) -> Vec<Turn> {
        let mut transcripts = self.transcripts.write().await;
        self.entry(&mut transcripts, user_id).clone()
    }

    /// Render the model prompt: the transcript joined line by line, the new
    /// user turn, and a trailing `Bot:` cue for the completion.
    pub async fn render_prompt(&self, user_id: &str, input: &str) -> String {
        let mut transcripts = self.transcripts.write().await;
        let turns = self.entry(&mut transcripts, user_id);

        let mut prompt = turns.iter().map(Turn::line).collect::<Vec<_>>().join("\n");
        prompt.push_str(&format!("\nUser: {input}\nBot:"));
        prompt
    }

    /// Append a completed user/bot exchange to a user's transcript.
    pub async fn append(&self, user_id: &str, user_text: &str, bot_text: &str) {
        let mut transcripts = self.transcripts.write().await;
        let turns = self.entry(&mut transcripts, user_id);

        turns.push(Turn {
            role: Role::User,
            text: user_text.to_string(),
        });
        turns.push(Turn {
            role: Role::Bot,
            text: bot_text.to_string(),
        });

        if let Some(max) = self.max_turns {
            // Evict oldest user/bot pairs; the system turn stays put.
            while turns.len().saturating_sub(1) > max {
                turns.drain(1..3);
            }
        }
    }

    fn entry<'a>(
        &self,
        transcripts: &'a mut HashMap<String, Vec<Turn>>,
        user_id: &str,
    ) -> &'a mut Vec<Turn> {
        transcripts.entry(user_id.to_string()).or_insert_with(|| {
            tracing::debug!(user_id, "Seeding new transcript");
            vec![Turn {
                role: Role::System,
                text: self.persona.clone(),
            }]
        })
    }
}
