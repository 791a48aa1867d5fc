//! arXiv source implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_rs::parser;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{SearchQuery, SourceType};
use crate::sources::{check_status, ProviderItem, Source, SourceCapabilities, SourceError};
use crate::utils::HttpClient;

/// Base URL for arXiv PDFs
pub const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";
/// Base URL for arXiv abstract pages
pub const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

/// arXiv source
///
/// Queries the arXiv export API and parses its Atom feed.
#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl ArxivSource {
    /// Create a new arXiv source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(config.timeouts.metadata())?;
        Ok(Self::with_client(Arc::new(client), &config.endpoints.arxiv))
    }

    /// Create with a custom HTTP client (for testing)
    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?search_query={}&start=0&max_results={}",
            self.base_url,
            urlencoding::encode(&format!("all:{}", query.query)),
            query.max_results
        )
    }

    /// Parse an Atom feed body into entries, keeping at most `max_results`
    pub fn parse_feed(body: &[u8], max_results: usize) -> Result<Vec<ArxivEntry>, SourceError> {
        let feed = parser::parse(body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Atom feed: {}", e)))?;

        Ok(feed
            .entries
            .iter()
            .take(max_results)
            .map(ArxivEntry::from_feed_entry)
            .collect())
    }
}

#[async_trait]
impl Source for ArxivSource {
    fn source_type(&self) -> SourceType {
        SourceType::Arxiv
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<ProviderItem>, SourceError> {
        let response = self
            .client
            .get(&self.search_url(query))
            .header("Accept", "application/atom+xml")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch arXiv results: {}", e)))?;

        let bytes = check_status(response, "arXiv")?
            .bytes()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))?;

        let entries = Self::parse_feed(bytes.as_ref(), query.max_results)?;
        tracing::debug!(count = entries.len(), "arXiv returned entries");

        Ok(entries.into_iter().map(ProviderItem::Arxiv).collect())
    }
}

/// One entry of the arXiv Atom feed
#[derive(Debug, Clone, Default)]
pub struct ArxivEntry {
    pub title: Option<String>,
    pub authors: Vec<String>,
    /// Last path segment of the entry's abs URL, version suffix included
    pub arxiv_id: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl ArxivEntry {
    fn from_feed_entry(entry: &feed_rs::model::Entry) -> Self {
        // feed-rs invents a UUID for entries without <id>; only abs URLs count
        let arxiv_id = entry
            .id
            .trim()
            .split_once("arxiv.org/abs/")
            .and_then(|(_, path)| path.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self {
            title: entry.title.as_ref().map(|t| t.content.trim().to_string()),
            authors: entry
                .authors
                .iter()
                .map(|a| a.name.trim().to_string())
                .collect(),
            arxiv_id,
            published: entry.published,
            summary: entry.summary.as_ref().map(|s| s.content.trim().to_string()),
        }
    }
}
