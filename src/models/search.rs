//! Search request and open-access result models.

use serde::{Deserialize, Serialize};

/// Search query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search string
    pub query: String,

    /// Maximum number of results requested from each source
    pub max_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: 10,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// Outcome of an open-access check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccessResult {
    pub is_open_access: bool,
    pub pdf_url: Option<String>,
    /// Host of the PDF ("arXiv", or the aggregator's host type)
    pub source: Option<String>,
}

impl OpenAccessResult {
    /// A negative result
    pub fn closed() -> Self {
        Self::default()
    }
}
