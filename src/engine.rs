//! Mention-handling engine
//!
//! One inbound mention becomes one call to [`Engine::handle_mention`],
//! which always produces a user-facing reply string: canned bypasses are
//! checked first, then the classifier routes to the ingestion pipeline
//! (link → extract → summarize/label → persist) or the query pipeline
//! (transcript → model → transcript update). Every collaborator with a
//! network edge is injected behind a trait so the pipelines are testable
//! in isolation.

use crate::classifier::{Classification, Classifier};
use crate::extract::Extractor;
use crate::history::ConversationStore;
use crate::labels::LabelStore;
use crate::llm::{prompt, LanguageModel};
use crate::notion::{LinkEntry, LinkStore};
use std::sync::Arc;

/// Reply to classification or model failures.
pub const APOLOGY: &str = "Sorry, I couldn't process that.";

/// Reply when content extraction fails; nothing was persisted.
pub const EXTRACTION_FAILED: &str =
    "Sorry, I couldn't read that page, so the link was not saved.";

/// Reply when the Notion write fails; nothing was persisted.
pub const PERSISTENCE_FAILED: &str =
    "Sorry, I couldn't save that link to Notion. Please try again later.";

/// Canned usage message for `-h` / `-help`.
pub const USAGE: &str = "Here's what I can do:\n\
    • mention me with a URL (optionally followed by labels) and I'll save it to Notion\n\
    • mention me with `ping` to check that I'm alive\n\
    • mention me with anything else to chat\n\
    • `-h` or `-help` shows this message";

/// One inbound mention, already stripped of the bot mention itself.
#[derive(Debug, Clone)]
pub struct MentionEvent {
    pub user_id: String,
    pub channel_id: String,
    pub ts: String,
    pub text: String,
}

/// The classification-and-ingestion core.
pub struct Engine {
    classifier: Classifier,
    model: Arc<dyn LanguageModel>,
    extractor: Arc<dyn Extractor>,
    links: Arc<dyn LinkStore>,
    labels: Arc<LabelStore>,
    history: Arc<ConversationStore>,
    max_label_suggestions: usize,
}

impl Engine {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        extractor: Arc<dyn Extractor>,
        links: Arc<dyn LinkStore>,
        labels: Arc<LabelStore>,
        history: Arc<ConversationStore>,
        max_label_suggestions: usize,
    ) -> Self {
        Self {
            classifier: Classifier::new(model.clone()),
            model,
            extractor,
            links,
            labels,
            history,
            max_label_suggestions,
        }
    }

    /// Handle one mention and produce the reply to post back.
    ///
    /// Failures never escape: each maps to its explicit user-facing
    /// message, with the underlying error logged alongside the stage it
    /// came from.
    pub async fn handle_mention(&self, event: &MentionEvent) -> String {
        let text = event.text.trim();

        // Bypasses run before any classification, in this order.
        if text.eq_ignore_ascii_case("ping") {
            return format!("Hello <@{}>! Pong!", event.user_id);
        }
        if text.eq_ignore_ascii_case("-h") || text.eq_ignore_ascii_case("-help") {
            return USAGE.to_string();
        }

        match self.classifier.classify(text).await {
            Ok(Classification::Link { url, labels }) => match self.ingest(&url, &labels).await {
                Ok(reply) => reply,
                Err(crate::Error::Extraction(e)) => {
                    tracing::warn!(stage = "extract", url = %url, error = %e, "Ingestion aborted");
                    EXTRACTION_FAILED.to_string()
                }
                Err(crate::Error::Persistence(e)) => {
                    tracing::error!(stage = "persist", url = %url, error = %e, "Ingestion aborted");
                    PERSISTENCE_FAILED.to_string()
                }
                Err(e) => {
                    tracing::error!(stage = "ingest", url = %url, error = %e, "Ingestion aborted");
                    APOLOGY.to_string()
                }
            },
            Ok(Classification::Query) => self.converse(&event.user_id, text).await,
            Ok(Classification::Malformed) => {
                tracing::warn!(text, "Malformed classification, treating as query");
                self.converse(&event.user_id, text).await
            }
            Err(e) => {
                tracing::error!(stage = "classify", error = %e, "Classification failed");
                APOLOGY.to_string()
            }
        }
    }

    /// Ingestion pipeline: Extracted → Labeled → Persisted → Acknowledged.
    async fn ingest(&self, url: &str, caller_labels: &[String]) -> crate::Result<String> {
        let page = self.extractor.extract(url).await?;

        // One structured model call: the summary always, label suggestions
        // only when the caller supplied none.
        let want_suggestions = caller_labels.is_empty();
        let existing = self.labels.all().await;
        let max = if want_suggestions {
            self.max_label_suggestions
        } else {
            0
        };
        let completion = self.model.generate(&prompt::digest(&page.body, &existing, max)).await?;

        let summary = prompt::parse_summary(&completion);
        let labels = if want_suggestions {
            prompt::parse_labels(&completion, self.max_label_suggestions)
        } else {
            caller_labels.to_vec()
        };

        // Vocabulary grows before persistence; a failed write below does
        // not roll the labels back.
        self.labels.add(&labels).await?;

        let entry = LinkEntry {
            title: page.title,
            date: chrono::Local::now().date_naive(),
            labels,
            url: url.to_string(),
            summary: summary.clone(),
        };
        self.links.create_entry(&entry).await?;

        Ok(format!("Saved \"{}\" to Notion.\n> {summary}", entry.title))
    }

    /// Query pipeline: transcript in, completion out, transcript updated
    /// only on success.
    async fn converse(&self, user_id: &str, input: &str) -> String {
        let prompt = self.history.render_prompt(user_id, input).await;

        match self.model.generate(&prompt).await {
            Ok(completion) => {
                self.history.append(user_id, input, &completion).await;
                completion
            }
            Err(e) => {
                tracing::error!(stage = "query", user_id, error = %e, "Model call failed");
                APOLOGY.to_string()
            }
        }
    }
}
