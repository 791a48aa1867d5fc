//! Utility modules supporting the bibliographic commands.
//!
//! - [`HttpClient`]: shared reqwest client with the crate's user agent and timeouts
//! - [`to_bibtex`] / [`to_orgmode`]: citation rendering
//! - [`format_search_simple`] / [`format_record_simple`]: plain-text output
//! - [`download_pdf`] / [`extract_doi_from_pdf`]: PDF handling
//!
//! # Rendering a record
//!
//! ```rust
//! use biblio::models::{Record, SourceType};
//! use biblio::utils::{format_citation, CitationStyle, FormatOptions};
//!
//! let mut record = Record::new(SourceType::CrossRef);
//! record.title = Some("Notes on the Analytical Engine".to_string());
//! record.authors = vec!["Ada Lovelace".to_string()];
//! record.year = Some(1843);
//!
//! let bibtex = format_citation(&record, CitationStyle::Bibtex, &FormatOptions::default());
//! assert!(bibtex.starts_with("@article{Lovelace1843Notes-on-the,"));
//! ```

mod cite;
mod display;
mod http;
mod pdf;

pub use cite::{
    bibtex_entry_type, format_citation, format_citations, generate_citation_key,
    sanitize_bibtex_key, to_bibtex, to_orgmode, CitationStyle, FormatOptions,
};
pub use display::{doi_error_message, format_record_simple, format_search_simple};
pub use http::{HttpClient, DOWNLOAD_USER_AGENT};
pub use pdf::{
    download_pdf, extract_doi_from_pdf, extract_text, find_doi, PdfError, DOI_SEARCH_PAGES,
};
