//! Prompt builders and structured-response parsers
//!
//! The model is asked for rigidly formatted output (`URL: ...` / `QUERY`,
//! `Summary:` / `Labels:` sections) and these helpers are the only place
//! that format lives. All of them are pure and covered by tests.

/// Instruction prompt for the URL-vs-query classification call.
pub fn classify(input: &str) -> String {
    format!(
        "Classify the following input as either 'URL' or 'QUERY'. If it is a URL, \
         extract the URL and any user-provided labels that appear after it. Labels are \
         any words or symbols following the URL. Return the result strictly in the format \
         'URL: https://example.com/page label1 label2' for URLs with labels, or \
         'URL: https://example.com/page' for URLs without labels. If the input is not a \
         URL, return 'QUERY'. Do not include any additional text. Input: {input}"
    )
}

/// Prompt for summarizing extracted page content, optionally asking for
/// label suggestions when the caller supplied none.
///
/// `existing` is the current vocabulary, offered to the model so it prefers
/// known labels over inventing near-duplicates.
pub fn digest(content: &str, existing: &[String], max_labels: usize) -> String {
    if max_labels == 0 {
        format!(
            "Given the following website content, please provide a short summary \
             (max 3 sentences).\n\n\
             Content: {content}\n\n\
             Format your response as follows and do not include any additional text \
             beyond the specified fields or add any markdown support:\n\
             Summary: [Your summary here]"
        )
    } else {
        format!(
            "Given the following website content, please provide:\n\
             1. A short summary (max 3 sentences)\n\
             2. Up to {max_labels} labels for this content (prioritize using existing \
             labels if it makes sense from this list: {existing}. If necessary, suggest \
             new meaningful labels)\n\n\
             Content: {content}\n\n\
             Format your response as follows and do not include any additional text \
             beyond the specified fields or add any markdown support:\n\
             Summary: [Your summary here]\n\
             Labels: [comma-separated list of labels]",
            existing = existing.join(", "),
        )
    }
}

/// Pull the summary out of a `Summary:` / `Labels:` structured completion.
///
/// Falls back to the whole trimmed completion when the model ignored the
/// format.
pub fn parse_summary(completion: &str) -> String {
    let text = completion.trim();
    let Some(start) = text.find("Summary:") else {
        return text.to_string();
    };
    let after = &text[start + "Summary:".len()..];
    let end = after.find("Labels:").unwrap_or(after.len());
    after[..end].trim().to_string()
}

/// Pull up to `max` labels out of the `Labels:` section of a completion.
///
/// Returns an empty list when no section is present.
pub fn parse_labels(completion: &str, max: usize) -> Vec<String> {
    let Some(start) = completion.find("Labels:") else {
        return Vec::new();
    };
    let after = &completion[start + "Labels:".len()..];
    let line = after.lines().next().unwrap_or("");
    line.split(',')
        .map(|label| label.trim().trim_matches(|c| c == '[' || c == ']').trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_embeds_input() {
        let prompt = classify("https://example.com rust");
        assert!(prompt.contains("Input: https://example.com rust"));
        assert!(prompt.starts_with("Classify the following input"));
    }

    #[test]
    fn test_digest_without_labels_requested() {
        let prompt = digest("page text", &[], 0);
        assert!(prompt.contains("Summary:"));
        assert!(!prompt.contains("Labels:"));
    }

    #[test]
    fn test_digest_offers_existing_vocabulary() {
        let existing = vec!["rust".to_string(), "ml".to_string()];
        let prompt = digest("page text", &existing, 3);
        assert!(prompt.contains("Up to 3 labels"));
        assert!(prompt.contains("rust, ml"));
        assert!(prompt.contains("Labels:"));
    }

    #[test]
    fn test_parse_summary_with_labels_section() {
        let completion = "Summary: A paper about attention.\nLabels: ml, transformers";
        assert_eq!(parse_summary(completion), "A paper about attention.");
    }

    #[test]
    fn test_parse_summary_fallback_on_freeform() {
        let completion = "  This page introduces attention mechanisms.  ";
        assert_eq!(
            parse_summary(completion),
            "This page introduces attention mechanisms."
        );
    }

    #[test]
    fn test_parse_labels() {
        let completion = "Summary: S.\nLabels: ml, transformers, attention";
        assert_eq!(
            parse_labels(completion, 3),
            vec!["ml", "transformers", "attention"]
        );
    }

    #[test]
    fn test_parse_labels_caps_at_max() {
        let completion = "Labels: a, b, c, d, e";
        assert_eq!(parse_labels(completion, 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_labels_strips_brackets_and_blanks() {
        let completion = "Labels: [ml], , transformers";
        assert_eq!(parse_labels(completion, 3), vec!["ml", "transformers"]);
    }

    #[test]
    fn test_parse_labels_missing_section() {
        assert!(parse_labels("Summary: only a summary", 3).is_empty());
    }

    #[test]
    fn test_parse_labels_ignores_following_lines() {
        let completion = "Labels: ml, rust\nSomething else entirely";
        assert_eq!(parse_labels(completion, 3), vec!["ml", "rust"]);
    }
}
