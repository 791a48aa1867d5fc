//! Canonical bibliographic record shared by every source.

use serde::{Deserialize, Deserializer, Serialize};

/// The source/provider a record was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "CrossRef", alias = "crossref")]
    CrossRef,
    #[serde(rename = "arXiv", alias = "arxiv")]
    Arxiv,
    #[serde(rename = "DBLP", alias = "dblp")]
    Dblp,
}

impl SourceType {
    /// Search sources in the order the aggregator consults them
    pub const SEARCH_ORDER: [SourceType; 3] =
        [SourceType::CrossRef, SourceType::Arxiv, SourceType::Dblp];

    /// Returns the display name of the source
    pub fn name(&self) -> &'static str {
        match self {
            SourceType::CrossRef => "CrossRef",
            SourceType::Arxiv => "arXiv",
            SourceType::Dblp => "DBLP",
        }
    }

    /// Returns the source identifier used by the registry and the CLI
    pub fn id(&self) -> &'static str {
        match self {
            SourceType::CrossRef => "crossref",
            SourceType::Arxiv => "arxiv",
            SourceType::Dblp => "dblp",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A bibliographic record normalized from any source
///
/// Every field is optional. Absent values serialize as missing keys rather
/// than empty strings. Records built by a source always carry `source`;
/// hand-written input may omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Author display names in order of appearance
    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    /// Journal / container title (CrossRef)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,

    /// Publication venue (DBLP)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,

    /// Source-specific publication type tag (e.g. "journal-article")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,

    /// arXiv summary text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    /// Provenance tag; unknown labels read as absent
    #[serde(
        default,
        deserialize_with = "deserialize_source",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<SourceType>,
}

impl Record {
    /// Create an empty record tagged with its source
    pub fn new(source: SourceType) -> Self {
        Self {
            title: None,
            authors: Vec::new(),
            year: None,
            doi: None,
            journal: None,
            venue: None,
            volume: None,
            issue: None,
            pages: None,
            publisher: None,
            r#type: None,
            url: None,
            r#abstract: None,
            summary: None,
            arxiv_id: None,
            source: Some(source),
        }
    }

    /// Abstract text, falling back to the arXiv summary
    pub fn abstract_or_summary(&self) -> Option<&str> {
        non_empty(&self.r#abstract).or_else(|| non_empty(&self.summary))
    }

    /// Journal name, falling back to the venue
    pub fn journal_or_venue(&self) -> Option<&str> {
        non_empty(&self.journal).or_else(|| non_empty(&self.venue))
    }
}

/// Treat empty strings the same as missing values when rendering
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Years arrive as integers from our own output but as strings from older tools.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearValue {
        Int(i32),
        Text(String),
    }

    Ok(
        match Option::<YearValue>::deserialize(deserializer)? {
            Some(YearValue::Int(year)) => Some(year),
            Some(YearValue::Text(text)) => text.trim().parse().ok(),
            None => None,
        },
    )
}

/// Accept any provenance label, keeping only the ones a source produces.
fn deserialize_source<'de, D>(deserializer: D) -> Result<Option<SourceType>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match SourceType::deserialize(&value) {
        Ok(source) => Ok(Some(source)),
        Err(_) => {
            tracing::debug!(label = %value, "Ignoring unknown record source");
            Ok(None)
        }
    }
}
