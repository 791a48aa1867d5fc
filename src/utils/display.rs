//! Plain-text output for the `simple` output mode.

use std::fmt::Write;

use crate::models::{non_empty, Record};
use crate::sources::SourceError;

fn year_or_na(record: &Record) -> String {
    record
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Numbered listing of search results.
///
/// Each entry starts with a blank line, then `N. Title` and indented
/// Authors, Year, Source and optional DOI / arXiv lines.
pub fn format_search_simple(records: &[Record]) -> String {
    let mut out = String::new();

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}. {}",
            i + 1,
            non_empty(&record.title).unwrap_or("No title")
        );
        let _ = writeln!(out, "   Authors: {}", record.authors.join(", "));
        let _ = writeln!(out, "   Year: {}", year_or_na(record));
        let source = record.source.map_or("Unknown", |source| source.name());
        let _ = writeln!(out, "   Source: {}", source);
        if let Some(doi) = non_empty(&record.doi) {
            let _ = writeln!(out, "   DOI: {}", doi);
        }
        if let Some(arxiv_id) = non_empty(&record.arxiv_id) {
            let _ = writeln!(out, "   arXiv: {}", arxiv_id);
        }
    }

    out
}

/// Key/value summary of a single looked-up record
pub fn format_record_simple(record: &Record) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Title: {}", non_empty(&record.title).unwrap_or("N/A"));
    let _ = writeln!(out, "Authors: {}", record.authors.join(", "));
    let _ = writeln!(out, "Year: {}", year_or_na(record));
    let _ = writeln!(
        out,
        "Journal: {}",
        non_empty(&record.journal).unwrap_or("N/A")
    );
    for (label, value) in [
        ("Volume", &record.volume),
        ("Issue", &record.issue),
        ("Pages", &record.pages),
    ] {
        if let Some(value) = non_empty(value) {
            let _ = writeln!(out, "{}: {}", label, value);
        }
    }
    let _ = writeln!(out, "DOI: {}", non_empty(&record.doi).unwrap_or("N/A"));
    if let Some(url) = non_empty(&record.url) {
        let _ = writeln!(out, "URL: {}", url);
    }

    out
}

/// Diagnostic for a failed DOI lookup; a missing DOI reads differently from other failures
pub fn doi_error_message(doi: &str, error: &SourceError) -> String {
    match error {
        SourceError::NotFound(_) => format!("DOI not found: {}", doi),
        other => format!("Error looking up DOI: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;

    #[test]
    fn test_search_simple_listing() {
        let mut first = Record::new(SourceType::CrossRef);
        first.title = Some("Paper One".to_string());
        first.authors = vec!["A One".to_string(), "B Two".to_string()];
        first.year = Some(2020);
        first.doi = Some("10.1000/one".to_string());

        let mut second = Record::new(SourceType::Arxiv);
        second.arxiv_id = Some("2301.00001v1".to_string());

        let expected = concat!(
            "\n1. Paper One\n",
            "   Authors: A One, B Two\n",
            "   Year: 2020\n",
            "   Source: CrossRef\n",
            "   DOI: 10.1000/one\n",
            "\n2. No title\n",
            "   Authors: \n",
            "   Year: N/A\n",
            "   Source: arXiv\n",
            "   arXiv: 2301.00001v1\n",
        );
        assert_eq!(format_search_simple(&[first, second]), expected);
    }

    #[test]
    fn test_search_simple_without_source() {
        let mut record = Record::new(SourceType::Dblp);
        record.source = None;
        assert!(format_search_simple(&[record]).contains("   Source: Unknown\n"));
    }

    #[test]
    fn test_search_simple_empty() {
        assert_eq!(format_search_simple(&[]), "");
    }

    #[test]
    fn test_record_simple() {
        let mut record = Record::new(SourceType::CrossRef);
        record.title = Some("Deep learning".to_string());
        record.authors = vec!["Yann LeCun".to_string(), "Yoshua Bengio".to_string()];
        record.year = Some(2015);
        record.journal = Some("Nature".to_string());
        record.volume = Some("521".to_string());
        record.pages = Some("436-444".to_string());
        record.doi = Some("10.1038/nature14539".to_string());

        let expected = "Title: Deep learning
Authors: Yann LeCun, Yoshua Bengio
Year: 2015
Journal: Nature
Volume: 521
Pages: 436-444
DOI: 10.1038/nature14539
";
        assert_eq!(format_record_simple(&record), expected);
    }

    #[test]
    fn test_record_simple_missing_fields() {
        let record = Record::new(SourceType::CrossRef);
        let output = format_record_simple(&record);
        assert!(output.starts_with("Title: N/A\n"));
        assert!(output.contains("Journal: N/A\n"));
        assert!(output.ends_with("DOI: N/A\n"));
    }

    #[test]
    fn test_doi_error_message() {
        let not_found = SourceError::NotFound("10.1000/missing".to_string());
        assert_eq!(
            doi_error_message("10.1000/missing", &not_found),
            "DOI not found: 10.1000/missing"
        );

        let api = SourceError::Api("CrossRef returned 500".to_string());
        assert!(doi_error_message("10.1000/x", &api).starts_with("Error looking up DOI: "));
    }
}
