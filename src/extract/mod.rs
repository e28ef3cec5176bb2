//! Content extraction
//!
//! Turns a raw URL into a title and a body suitable for summarization and
//! storage. Two strategies exist: direct HTML scraping (the default) and a
//! reader-proxy fetch for pages that only render with JavaScript. Exactly
//! one strategy is picked per URL before fetching; they are never combined.

mod html;
mod reader;

pub use html::parse_page;

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Extracted page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub body: String,
}

/// URL → content extraction seam, injected into the ingestion pipeline.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<PageContent>;
}

/// Which fetch path a URL takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchStrategy {
    /// Fetch the page and scrape its HTML.
    Direct,
    /// Fetch a fully rendered text version through the reader proxy.
    ReaderProxy,
}

/// HTTP-backed [`Extractor`].
pub struct WebExtractor {
    http: reqwest::Client,
    /// Reader-proxy base URL, e.g. `https://r.jina.ai`. `None` disables
    /// the proxy strategy entirely.
    reader_proxy: Option<String>,
    /// Hosts routed through the reader proxy.
    proxy_hosts: Vec<String>,
}

impl WebExtractor {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            reader_proxy: Some(reader::DEFAULT_PROXY.to_string()),
            proxy_hosts: Vec::new(),
        }
    }

    /// Route the given hosts through the reader proxy.
    pub fn with_proxy_hosts(mut self, hosts: Vec<String>) -> Self {
        self.proxy_hosts = hosts;
        self
    }

    fn strategy_for(&self, url: &str) -> FetchStrategy {
        if self.reader_proxy.is_some() && self.proxy_hosts.iter().any(|h| host_of(url) == *h) {
            FetchStrategy::ReaderProxy
        } else {
            FetchStrategy::Direct
        }
    }

    async fn extract_direct(&self, url: &str) -> Result<PageContent> {
        // Classification output occasionally carries a trailing comma.
        let url = url.trim().trim_end_matches(',');

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("fetching {url} failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Extraction(format!(
                "fetching {url} returned status {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Extraction(format!("reading {url} failed: {e}")))?;

        let content = html::parse_page(&html);
        if content.title.is_empty() && content.body.is_empty() {
            return Err(Error::Extraction(format!(
                "{url} yielded no extractable content"
            )));
        }

        Ok(content)
    }
}

impl Default for WebExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for WebExtractor {
    async fn extract(&self, url: &str) -> Result<PageContent> {
        match self.strategy_for(url) {
            FetchStrategy::Direct => {
                tracing::debug!(url, "Extracting via direct scrape");
                self.extract_direct(url).await
            }
            FetchStrategy::ReaderProxy => {
                let proxy = self.reader_proxy.as_deref().unwrap_or(reader::DEFAULT_PROXY);
                tracing::debug!(url, proxy, "Extracting via reader proxy");
                reader::fetch_rendered(&self.http, proxy, url).await
            }
        }
    }
}

fn host_of(url: &str) -> String {
    url.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split(['/', '?'])
        .next()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://arxiv.org/abs/1234"), "arxiv.org");
        assert_eq!(host_of("http://example.com?q=1"), "example.com");
        assert_eq!(host_of("example.com/page"), "example.com");
    }

    #[test]
    fn test_strategy_selection() {
        let extractor =
            WebExtractor::new().with_proxy_hosts(vec!["app.example.com".to_string()]);

        assert_eq!(
            extractor.strategy_for("https://arxiv.org/abs/1234"),
            FetchStrategy::Direct
        );
        assert_eq!(
            extractor.strategy_for("https://app.example.com/dashboard"),
            FetchStrategy::ReaderProxy
        );
    }
}
