//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

use crate::models::{Record, SearchQuery, SourceType};
use crate::sources::{Source, SourceError};

/// A mock source that returns predefined records instead of calling an API.
#[derive(Debug)]
pub struct MockSource {
    source_type: SourceType,
    records: Mutex<Vec<Record>>,
    fail: bool,
}

impl MockSource {
    /// Create a mock that returns no records.
    pub fn new(source_type: SourceType) -> Self {
        Self::with_records(source_type, Vec::new())
    }

    /// Create a mock that returns `records` on every search.
    pub fn with_records(source_type: SourceType, records: Vec<Record>) -> Self {
        Self {
            source_type,
            records: Mutex::new(records),
            fail: false,
        }
    }

    /// Create a mock whose searches always fail with a network error.
    pub fn failing(source_type: SourceType) -> Self {
        Self {
            fail: true,
            ..Self::new(source_type)
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Record>, SourceError> {
        if self.fail {
            return Err(SourceError::Network(format!(
                "mock failure for '{}'",
                query.query
            )));
        }

        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.iter().take(query.max_results).cloned().collect())
    }
}
