//! # Biblio
//!
//! Bibliographic lookup tools: search CrossRef, arXiv and DBLP, resolve DOIs,
//! check open-access availability, and render references as BibTeX or
//! org-mode.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: The canonical [`Record`] and query/result types
//! - [`sources`]: Provider adapters behind the [`Source`] trait, plus the registry
//! - [`normalize`]: Mapping of raw provider items onto [`Record`]
//! - [`utils`]: HTTP client, citation rendering, PDF handling
//! - [`config`]: Configuration management

pub mod config;
pub mod models;
pub mod normalize;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{Record, SourceType};
pub use sources::{Source, SourceError, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
