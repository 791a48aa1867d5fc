//! Core data models for bibliographic records and search operations.

mod record;
mod search;

pub use record::{Record, SourceType};
pub(crate) use record::non_empty;
pub use search::{OpenAccessResult, SearchQuery};
