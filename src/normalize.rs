//! Mapping of provider items onto the canonical [`Record`].
//!
//! Providers disagree on shapes: a CrossRef title is usually a one-element
//! array, a DBLP author list collapses to a bare object when there is only one
//! author. Those variations are captured by [`OneOrMany`] at deserialization
//! time and resolved here, once per provider, so nothing downstream has to
//! check shapes again. Missing keys at any depth simply leave the
//! corresponding record field empty.

use chrono::Datelike;
use serde::Deserialize;

use crate::models::{Record, SourceType};
use crate::sources::{
    ArxivEntry, CrossRefAuthor, CrossRefDate, CrossRefItem, DblpAuthor, DblpInfo, ProviderItem,
};

/// A JSON value that is either a single element or an array of them
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// The scalar itself, or the first element of the array
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::One(value) => Some(value),
            OneOrMany::Many(values) => values.into_iter().next(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Normalize any provider item; the variant decides the provenance tag
pub fn normalize(item: ProviderItem) -> Record {
    match item {
        ProviderItem::CrossRef(item) => normalize_crossref(item),
        ProviderItem::Arxiv(entry) => normalize_arxiv(entry),
        ProviderItem::Dblp(info) => normalize_dblp(info),
    }
}

pub fn normalize_crossref(item: CrossRefItem) -> Record {
    let mut record = Record::new(SourceType::CrossRef);

    record.title = item.title.and_then(OneOrMany::into_first);
    record.authors = item
        .author
        .unwrap_or_default()
        .into_iter()
        .filter_map(crossref_author_name)
        .collect();
    record.year = [item.published_print, item.published_online]
        .into_iter()
        .flatten()
        .find_map(|date| crossref_year(&date));
    record.doi = item.doi;
    record.journal = item.container_title.and_then(OneOrMany::into_first);
    record.volume = item.volume;
    record.issue = item.issue;
    record.pages = item.page;
    record.publisher = item.publisher;
    record.r#type = item.r#type;
    record.url = item.url;
    record.r#abstract = item.r#abstract;

    record
}

/// "given family", skipping whichever part is missing
fn crossref_author_name(author: CrossRefAuthor) -> Option<String> {
    let parts: Vec<String> = [author.given, author.family]
        .into_iter()
        .flatten()
        .collect();

    if parts.is_empty() {
        author.name
    } else {
        Some(parts.join(" "))
    }
}

/// First element of the first `date-parts` array
fn crossref_year(date: &CrossRefDate) -> Option<i32> {
    date.date_parts
        .as_ref()
        .and_then(|parts| parts.first())
        .and_then(|first| first.first())
        .copied()
        .flatten()
}

pub fn normalize_arxiv(entry: ArxivEntry) -> Record {
    let mut record = Record::new(SourceType::Arxiv);

    record.title = entry.title;
    record.authors = entry.authors;
    record.year = entry.published.map(|published| published.year());
    record.arxiv_id = entry.arxiv_id;
    record.summary = entry.summary;

    record
}

pub fn normalize_dblp(info: DblpInfo) -> Record {
    let mut record = Record::new(SourceType::Dblp);

    record.title = info.title;
    record.authors = info
        .authors
        .and_then(|authors| authors.author)
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(|author| match author {
            DblpAuthor::Named { text } => text.unwrap_or_default(),
            DblpAuthor::Plain(name) => name,
        })
        .collect();
    record.year = info.year.and_then(|year| year.trim().parse().ok());
    record.venue = info.venue.and_then(OneOrMany::into_first);
    record.doi = info.doi;
    record.url = info.url;
    record.r#type = info.r#type;

    record
}
