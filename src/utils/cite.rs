//! Citation rendering in BibTeX and org-mode.
//!
//! Every field is emitted only when present and non-empty; records coming
//! from different providers fill very different subsets of [`Record`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{non_empty, Record};
use crate::sources::ARXIV_ABS_URL;

/// Maximum length of a generated citation key
const MAX_KEY_LEN: usize = 50;

const DOI_RESOLVER: &str = "https://doi.org";

/// Citation style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// BibTeX entry
    Bibtex,
    /// org-mode heading with a property drawer
    OrgMode,
}

/// Options shared by the renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// BibTeX key to use instead of a generated one
    pub citation_key: Option<String>,
    /// org-mode heading depth
    pub level: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            citation_key: None,
            level: 2,
        }
    }
}

/// Format a record in the specified style
pub fn format_citation(record: &Record, style: CitationStyle, options: &FormatOptions) -> String {
    match style {
        CitationStyle::Bibtex => to_bibtex(record, options.citation_key.as_deref()),
        CitationStyle::OrgMode => to_orgmode(record, options.level),
    }
}

/// Format several records, separated by a blank line
pub fn format_citations(
    records: &[Record],
    style: CitationStyle,
    options: &FormatOptions,
) -> String {
    records
        .iter()
        .map(|record| format_citation(record, style, options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keep only `[A-Za-z0-9-]`, after turning spaces into hyphens
pub fn sanitize_bibtex_key(text: &str) -> String {
    text.replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Generate a citation key: first author's last name, year, first three title words
pub fn generate_citation_key(record: &Record) -> String {
    let author = record
        .authors
        .first()
        .and_then(|author| author.split_whitespace().last())
        .map(sanitize_bibtex_key)
        .unwrap_or_else(|| "unknown".to_string());

    let year = record.year.map(|year| year.to_string()).unwrap_or_default();

    let title = record
        .title
        .as_deref()
        .map(|title| {
            let words: Vec<&str> = title.split_whitespace().take(3).collect();
            sanitize_bibtex_key(&words.join("-"))
        })
        .unwrap_or_default();

    format!("{}{}{}", author, year, title)
        .chars()
        .take(MAX_KEY_LEN)
        .collect()
}

/// BibTeX entry type for a record
pub fn bibtex_entry_type(record: &Record) -> &'static str {
    match record.r#type.as_deref() {
        Some("journal-article") => "article",
        Some("book-chapter") => "inbook",
        Some("proceedings-article") => "inproceedings",
        _ if non_empty(&record.arxiv_id).is_some() => "misc",
        _ => "article",
    }
}

/// Render a record as a BibTeX entry.
///
/// Format: @type{key,
///   title = {Title},
///   author = {First Author and Second Author},
///   ...
///   publisher = {Publisher}
/// }
pub fn to_bibtex(record: &Record, citation_key: Option<&str>) -> String {
    let key = citation_key
        .map(str::to_string)
        .unwrap_or_else(|| generate_citation_key(record));

    let mut fields: Vec<(&str, String)> = Vec::new();
    let mut push = |name, value: Option<&str>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            fields.push((name, value.to_string()));
        }
    };

    let authors = record.authors.join(" and ");
    let year = record.year.map(|year| year.to_string());

    push("title", non_empty(&record.title));
    push("author", Some(authors.as_str()));
    push("year", year.as_deref());
    push("journal", record.journal_or_venue());
    push("volume", non_empty(&record.volume));
    push("number", non_empty(&record.issue));
    push("pages", non_empty(&record.pages));
    push("doi", non_empty(&record.doi));
    if let Some(arxiv_id) = non_empty(&record.arxiv_id) {
        push("eprint", Some(arxiv_id));
        push("archivePrefix", Some("arXiv"));
    }
    push("url", non_empty(&record.url));
    push("publisher", non_empty(&record.publisher));

    let mut lines = vec![format!("@{}{{{},", bibtex_entry_type(record), key)];
    let last = fields.len().saturating_sub(1);
    for (index, (name, value)) in fields.iter().enumerate() {
        let separator = if index == last { "" } else { "," };
        lines.push(format!("  {} = {{{}}}{}", name, value, separator));
    }
    lines.push("}".to_string());

    lines.join("\n")
}

/// Render a record as an org-mode heading with a property drawer
pub fn to_orgmode(record: &Record, level: usize) -> String {
    let stars = "*".repeat(level);
    let title = non_empty(&record.title).unwrap_or("Untitled");

    let mut lines = vec![format!("{} {}", stars, title), ":PROPERTIES:".to_string()];
    let mut property = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            lines.push(format!(":{}: {}", name, value));
        }
    };

    let owned = |value: &Option<String>| non_empty(value).map(str::to_string);

    property("AUTHORS", Some(record.authors.join(", ")));
    property("YEAR", record.year.map(|year| year.to_string()));
    if let Some(doi) = non_empty(&record.doi) {
        property("DOI", Some(doi.to_string()));
        property("DOI_URL", Some(format!("{}/{}", DOI_RESOLVER, doi)));
    }
    if let Some(arxiv_id) = non_empty(&record.arxiv_id) {
        property("ARXIV", Some(arxiv_id.to_string()));
        property("ARXIV_URL", Some(format!("{}/{}", ARXIV_ABS_URL, arxiv_id)));
    }
    property("URL", owned(&record.url));
    property("JOURNAL", owned(&record.journal));
    property("VENUE", owned(&record.venue));
    property("VOLUME", owned(&record.volume));
    property("ISSUE", owned(&record.issue));
    property("PAGES", owned(&record.pages));
    property("PUBLISHER", owned(&record.publisher));
    property("SOURCE", record.source.map(|source| source.name().to_string()));

    lines.push(":END:".to_string());

    if let Some(body) = record.abstract_or_summary() {
        lines.push(String::new());
        lines.push(body.to_string());
    }

    lines.join("\n")
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationStyle::Bibtex => write!(f, "BibTeX"),
            CitationStyle::OrgMode => write!(f, "org-mode"),
        }
    }
}
