//! Bibliographic source adapters with a trait-based architecture.
//!
//! Each search source implements [`Source`]: it turns a free-text
//! [`SearchQuery`] into one provider request and returns the provider's raw
//! items as [`ProviderItem`]s. The [`normalize`](crate::normalize) module maps
//! those into canonical [`Record`]s, and [`SourceRegistry::aggregate`] runs the
//! selected sources in the fixed order CrossRef, arXiv, DBLP.
//!
//! Endpoints default to the public APIs and can be overridden through
//! [`Config`](crate::config::Config), which is how the tests point the
//! adapters at a local mock server.

mod arxiv;
mod crossref;
mod dblp;
mod registry;
mod unpaywall;

pub mod mock;

pub use arxiv::{ArxivEntry, ArxivSource, ARXIV_ABS_URL, ARXIV_PDF_URL};
pub use crossref::{CrossRefAuthor, CrossRefDate, CrossRefItem, CrossRefSource};
pub use dblp::{DblpAuthor, DblpInfo, DblpSource};
pub use mock::MockSource;
pub use registry::{SourceCapabilities, SourceRegistry};
pub use unpaywall::UnpaywallClient;

use crate::models::{Record, SearchQuery, SourceType};
use crate::normalize::normalize;
use async_trait::async_trait;

/// A raw item as returned by one provider, before normalization
#[derive(Debug, Clone)]
pub enum ProviderItem {
    CrossRef(CrossRefItem),
    Arxiv(ArxivEntry),
    Dblp(DblpInfo),
}

/// The Source trait defines the interface for all search sources.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Which provider this source talks to
    fn source_type(&self) -> SourceType;

    /// Unique identifier for this source (e.g. "crossref", "arxiv")
    fn id(&self) -> &str {
        self.source_type().id()
    }

    /// Human-readable name of this source
    fn name(&self) -> &str {
        self.source_type().name()
    }

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::SEARCH
    }

    /// Issue the provider request and return its raw items
    async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<ProviderItem>, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Search and normalize into canonical records, preserving provider ranking
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, SourceError> {
        let items = self.fetch(query).await?;
        Ok(items.into_iter().map(normalize).collect())
    }

    /// Get a record by its DOI
    async fn get_by_doi(&self, _doi: &str) -> Result<Record, SourceError> {
        Err(SourceError::NotImplemented)
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Network or transport error (timeout, DNS, connection refused)
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Record not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success HTTP status from the source
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

/// Strip resolver prefixes from a DOI ("https://doi.org/", "doi:")
pub fn clean_doi(doi: &str) -> String {
    let doi = doi.trim();
    let doi = doi
        .strip_prefix("https://doi.org/")
        .or_else(|| doi.strip_prefix("http://doi.org/"))
        .unwrap_or(doi);
    let doi = doi
        .strip_prefix("doi:")
        .or_else(|| doi.strip_prefix("DOI:"))
        .unwrap_or(doi);
    doi.trim().to_string()
}

/// Fail with [`SourceError::Api`] unless the response status is 2xx
pub(crate) fn check_status(
    response: reqwest::Response,
    source: &str,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Api(format!(
            "{} API returned status: {}",
            source, status
        )))
    }
}
