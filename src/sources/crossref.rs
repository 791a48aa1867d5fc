//! CrossRef source implementation.
//!
//! Uses the CrossRef REST API for free-text search (`/works?query=`) and DOI
//! lookup (`/works/{doi}`). Requests carry a `mailto` parameter so they are
//! served from CrossRef's polite pool.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{Record, SearchQuery, SourceType};
use crate::normalize::{normalize_crossref, OneOrMany};
use crate::sources::{
    check_status, clean_doi, ProviderItem, Source, SourceCapabilities, SourceError,
};
use crate::utils::HttpClient;

/// CrossRef source
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
    mailto: String,
}

impl CrossRefSource {
    /// Create a source against the public API with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(config.timeouts.metadata())?;
        Ok(Self::with_client(
            Arc::new(client),
            &config.endpoints.crossref,
            &config.contact_email,
        ))
    }

    /// Create with a custom HTTP client and endpoint
    pub fn with_client(client: Arc<HttpClient>, base_url: &str, mailto: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            mailto: mailto.to_string(),
        }
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/works?query={}&rows={}&mailto={}",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results,
            urlencoding::encode(&self.mailto)
        )
    }

    /// Decode items one at a time so a single odd item does not sink the page
    fn parse_items(values: Vec<serde_json::Value>) -> Vec<CrossRefItem> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable CrossRef item");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn source_type(&self) -> SourceType {
        SourceType::CrossRef
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH | SourceCapabilities::DOI_LOOKUP
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<ProviderItem>, SourceError> {
        let response = self
            .client
            .get(&self.search_url(query))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search CrossRef: {}", e)))?;

        let data: CrossRefResponse<CrossRefWorks> = check_status(response, "CrossRef")?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let items = Self::parse_items(data.message.items);
        tracing::debug!(count = items.len(), "CrossRef returned items");

        Ok(items.into_iter().map(ProviderItem::CrossRef).collect())
    }

    async fn get_by_doi(&self, doi: &str) -> Result<Record, SourceError> {
        let doi = clean_doi(doi);
        if doi.is_empty() {
            return Err(SourceError::InvalidRequest("Empty DOI".to_string()));
        }

        let url = format!("{}/works/{}", self.base_url, doi);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to fetch DOI: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(doi));
        }

        let data: CrossRefResponse<CrossRefItem> = check_status(response, "CrossRef")?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(normalize_crossref(data.message))
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CrossRefResponse<T> {
    message: T,
}

#[derive(Debug, Default, Deserialize)]
struct CrossRefWorks {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// One work from the CrossRef API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossRefItem {
    pub title: Option<OneOrMany<String>>,
    pub author: Option<Vec<CrossRefAuthor>>,
    pub published_print: Option<CrossRefDate>,
    pub published_online: Option<CrossRefDate>,
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub container_title: Option<OneOrMany<String>>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page: Option<String>,
    pub publisher: Option<String>,
    pub r#type: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
    pub r#abstract: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossRefAuthor {
    pub given: Option<String>,
    pub family: Option<String>,
    /// Organisational authors carry only a name
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossRefDate {
    pub date_parts: Option<Vec<Vec<Option<i32>>>>,
}
