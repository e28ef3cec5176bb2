//! Input classification
//!
//! One model call decides whether a mention is a link-save request or a
//! conversational query. The model's answer is parsed into a tagged
//! [`Classification`] so the pipelines branch on an exhaustive match
//! instead of string prefixes.

use crate::error::{Error, Result};
use crate::llm::{prompt, LanguageModel};
use std::sync::Arc;

/// Outcome of classifying one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A request to save a URL, with any caller-supplied labels.
    Link { url: String, labels: Vec<String> },
    /// A conversational query.
    Query,
    /// The model answered in the URL format but without a URL. Routed to
    /// the query pipeline by the caller.
    Malformed,
}

/// Parse the model's classification answer.
///
/// `URL: <url> [label ...]` becomes [`Classification::Link`]; a bare `URL:`
/// with nothing after the colon is [`Classification::Malformed`]; every
/// other response, `QUERY` included, is [`Classification::Query`].
pub fn parse_classification(response: &str) -> Classification {
    let response = response.trim();
    let Some(rest) = response.strip_prefix("URL:") else {
        return Classification::Query;
    };

    let mut tokens = rest.split_whitespace();
    let Some(url) = tokens.next() else {
        return Classification::Malformed;
    };

    Classification::Link {
        url: url.to_string(),
        labels: tokens.map(str::to_string).collect(),
    }
}

/// Model-backed classifier.
pub struct Classifier {
    model: Arc<dyn LanguageModel>,
}

impl Classifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Classify raw mention text with one model call.
    pub async fn classify(&self, text: &str) -> Result<Classification> {
        let response = self
            .model
            .generate(&prompt::classify(text))
            .await
            .map_err(|e| Error::Classification(e.to_string()))?;

        let classification = parse_classification(&response);
        tracing::debug!(?classification, "Input classified");

        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;

    #[test]
    fn test_parse_url_with_labels() {
        let result = parse_classification("URL: https://example.com/page label1 label2");
        assert_eq!(
            result,
            Classification::Link {
                url: "https://example.com/page".to_string(),
                labels: vec!["label1".to_string(), "label2".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_url_without_labels() {
        let result = parse_classification("URL: https://example.com/page");
        assert_eq!(
            result,
            Classification::Link {
                url: "https://example.com/page".to_string(),
                labels: vec![],
            }
        );
    }

    #[test]
    fn test_parse_url_surrounding_whitespace() {
        let result = parse_classification("  URL:   https://example.com  rust  \n");
        assert_eq!(
            result,
            Classification::Link {
                url: "https://example.com".to_string(),
                labels: vec!["rust".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(parse_classification("QUERY"), Classification::Query);
    }

    #[test]
    fn test_parse_freeform_is_query() {
        assert_eq!(
            parse_classification("I think this is a URL: maybe?"),
            Classification::Query
        );
        assert_eq!(parse_classification(""), Classification::Query);
    }

    #[test]
    fn test_parse_bare_prefix_is_malformed() {
        assert_eq!(parse_classification("URL:"), Classification::Malformed);
        assert_eq!(parse_classification("URL:   "), Classification::Malformed);
    }

    #[tokio::test]
    async fn test_classify_idempotent_with_deterministic_model() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok("URL: https://example.com rust".to_string()),
            Ok("URL: https://example.com rust".to_string()),
        ]));
        let classifier = Classifier::new(model);

        let first = classifier.classify("save this").await.unwrap();
        let second = classifier.classify("save this").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_classify_maps_model_failure() {
        let model = Arc::new(ScriptedModel::new(vec![Err(
            crate::error::Error::Model("down".to_string()),
        )]));
        let classifier = Classifier::new(model);

        let err = classifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
    }
}
