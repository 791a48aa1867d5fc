//! Registry of search sources and the aggregation pipeline.

use std::sync::Arc;

use super::{ArxivSource, CrossRefSource, DblpSource, Source, SourceError};
use crate::config::Config;
use crate::models::{Record, SearchQuery, SourceType};

bitflags::bitflags! {
    /// Capabilities that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const SEARCH = 1 << 0;
        const DOI_LOOKUP = 1 << 1;
    }
}

/// Registry for the available search sources
///
/// Sources are keyed by their [`SourceType`]; registering a second source
/// of the same type replaces the first.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with CrossRef, arXiv and DBLP configured from `config`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let mut registry = Self::new();
        registry.register(Arc::new(CrossRefSource::from_config(config)?));
        registry.register(Arc::new(ArxivSource::from_config(config)?));
        registry.register(Arc::new(DblpSource::from_config(config)?));
        Ok(registry)
    }

    /// Register a source
    pub fn register(&mut self, source: Arc<dyn Source>) {
        let source_type = source.source_type();
        self.sources.retain(|s| s.source_type() != source_type);
        self.sources.push(source);
    }

    /// Get a source by type
    pub fn get(&self, source_type: SourceType) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.source_type() == source_type)
    }

    /// Get a source by type, returning an error if not registered
    pub fn get_required(&self, source_type: SourceType) -> Result<&Arc<dyn Source>, SourceError> {
        self.get(source_type).ok_or_else(|| {
            SourceError::InvalidRequest(format!("Source '{}' not registered", source_type.id()))
        })
    }

    /// Get sources that support a specific capability
    pub fn with_capability(&self, capability: SourceCapabilities) -> Vec<&Arc<dyn Source>> {
        self.sources
            .iter()
            .filter(|s| s.capabilities().contains(capability))
            .collect()
    }

    /// The first registered source that resolves DOIs
    pub fn doi_source(&self) -> Result<&Arc<dyn Source>, SourceError> {
        self.with_capability(SourceCapabilities::DOI_LOOKUP)
            .into_iter()
            .next()
            .ok_or_else(|| {
                SourceError::InvalidRequest("No registered source supports DOI lookup".to_string())
            })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Search the selected sources one after another and concatenate the results.
    ///
    /// Sources are always consulted in [`SourceType::SEARCH_ORDER`]
    /// (CrossRef, arXiv, DBLP) regardless of the order of `selection` or of
    /// registration, so the output keeps per-source grouping and each
    /// provider's own ranking. A source that fails is logged and contributes
    /// no records.
    pub async fn aggregate(&self, query: &SearchQuery, selection: &[SourceType]) -> Vec<Record> {
        let mut records = Vec::new();

        for source_type in SourceType::SEARCH_ORDER {
            if !selection.contains(&source_type) {
                continue;
            }

            let Some(source) = self.get(source_type) else {
                tracing::warn!(source = source_type.id(), "Source not registered, skipping");
                continue;
            };

            match source.search(query).await {
                Ok(found) => {
                    tracing::info!(
                        source = source.name(),
                        count = found.len(),
                        "Search completed"
                    );
                    records.extend(found);
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Search failed");
                }
            }
        }

        records
    }
}
