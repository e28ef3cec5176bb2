//! Reader-proxy extraction
//!
//! Fetches `{proxy}/{url}`: the proxy renders the page (JavaScript
//! included) and returns a plain-text digest. Used for hosts the direct
//! scrape can't handle.

use super::PageContent;
use crate::error::{Error, Result};

pub(super) const DEFAULT_PROXY: &str = "https://r.jina.ai";

pub(super) async fn fetch_rendered(
    http: &reqwest::Client,
    proxy: &str,
    url: &str,
) -> Result<PageContent> {
    let full_url = format!("{}/{}", proxy.trim_end_matches('/'), url.trim());

    let response = http
        .get(&full_url)
        .send()
        .await
        .map_err(|e| Error::Extraction(format!("reader proxy fetch failed: {e}")))?;
    if !response.status().is_success() {
        return Err(Error::Extraction(format!(
            "reader proxy returned status {} for {url}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Extraction(format!("reading proxy response failed: {e}")))?;

    let content = parse_rendered(&body, url);
    if content.body.is_empty() {
        return Err(Error::Extraction(format!(
            "reader proxy returned no content for {url}"
        )));
    }

    Ok(content)
}

/// Split the proxy's digest into title and body.
///
/// The proxy prefixes its output with a `Title: ...` header line; when it
/// is missing, the URL itself stands in as the title.
fn parse_rendered(text: &str, url: &str) -> PageContent {
    let mut title = String::new();
    let mut body_lines = Vec::new();

    for line in text.lines() {
        if title.is_empty() {
            if let Some(rest) = line.strip_prefix("Title:") {
                title = rest.trim().to_string();
                continue;
            }
        }
        if line.starts_with("URL Source:") || line.starts_with("Markdown Content:") {
            continue;
        }
        body_lines.push(line);
    }

    if title.is_empty() {
        title = url.to_string();
    }

    PageContent {
        title,
        body: body_lines.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rendered_with_header() {
        let text = "Title: Example Page\nURL Source: https://example.com\n\
                    Markdown Content:\nThe rendered body.\nSecond line.";
        let content = parse_rendered(text, "https://example.com");

        assert_eq!(content.title, "Example Page");
        assert_eq!(content.body, "The rendered body.\nSecond line.");
    }

    #[test]
    fn test_parse_rendered_without_header() {
        let content = parse_rendered("Just body text.", "https://example.com");

        assert_eq!(content.title, "https://example.com");
        assert_eq!(content.body, "Just body text.");
    }
}
