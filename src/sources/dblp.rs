//! DBLP source implementation.
//!
//! Uses the DBLP publication search API in JSON mode.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{SearchQuery, SourceType};
use crate::normalize::OneOrMany;
use crate::sources::{check_status, ProviderItem, Source, SourceCapabilities, SourceError};
use crate::utils::HttpClient;

/// DBLP source
#[derive(Debug, Clone)]
pub struct DblpSource {
    client: Arc<HttpClient>,
    base_url: String,
}

impl DblpSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(config.timeouts.metadata())?;
        Ok(Self::with_client(Arc::new(client), &config.endpoints.dblp))
    }

    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}?q={}&h={}&format=json",
            self.base_url,
            urlencoding::encode(&query.query),
            query.max_results
        )
    }

    /// Unwrap each hit's `info` object, skipping hits that cannot be read.
    /// A hit without `info` still yields an empty record.
    fn parse_hits(hits: Vec<DblpHit>) -> Vec<DblpInfo> {
        hits.into_iter()
            .enumerate()
            .filter_map(|(index, hit)| match hit.info {
                serde_json::Value::Null => Some(DblpInfo::default()),
                info => match serde_json::from_value(info) {
                    Ok(info) => Some(info),
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Skipping unreadable DBLP hit");
                        None
                    }
                },
            })
            .collect()
    }
}

#[async_trait]
impl Source for DblpSource {
    fn source_type(&self) -> SourceType {
        SourceType::Dblp
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<ProviderItem>, SourceError> {
        let response = self
            .client
            .get(&self.search_url(query))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search DBLP: {}", e)))?;

        let data: DblpResponse = check_status(response, "DBLP")?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let infos = Self::parse_hits(data.result.hits.hit);
        tracing::debug!(count = infos.len(), "DBLP returned hits");

        Ok(infos.into_iter().map(ProviderItem::Dblp).collect())
    }
}

// ===== DBLP API Types =====

#[derive(Debug, Default, Deserialize)]
struct DblpResponse {
    #[serde(default)]
    result: DblpResult,
}

#[derive(Debug, Default, Deserialize)]
struct DblpResult {
    #[serde(default)]
    hits: DblpHits,
}

#[derive(Debug, Default, Deserialize)]
struct DblpHits {
    #[serde(default)]
    hit: Vec<DblpHit>,
}

#[derive(Debug, Default, Deserialize)]
struct DblpHit {
    #[serde(default)]
    info: serde_json::Value,
}

/// The `info` object of one DBLP hit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DblpInfo {
    pub title: Option<String>,
    pub authors: Option<DblpAuthors>,
    pub venue: Option<OneOrMany<String>>,
    pub year: Option<String>,
    pub r#type: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
}

/// `authors` wraps either one author or a list of them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DblpAuthors {
    pub author: Option<OneOrMany<DblpAuthor>>,
}

/// An author entry: usually `{"@pid": ..., "text": "Name"}`, sometimes a bare string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DblpAuthor {
    Named { text: Option<String> },
    Plain(String),
}
