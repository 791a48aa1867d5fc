//! Integration tests for biblio
//!
//! These tests drive the registry, the DOI lookup, the open-access check and
//! the renderers end-to-end against a local mock HTTP server.

use biblio::config::Config;
use biblio::models::{SearchQuery, SourceType};
use biblio::sources::{Source, SourceCapabilities, SourceError, SourceRegistry, UnpaywallClient};
use biblio::utils::{
    doi_error_message, format_citations, to_bibtex, to_orgmode, CitationStyle, FormatOptions,
};
use mockito::{Matcher, Server, ServerGuard};

const CROSSREF_SEARCH: &str = r#"{
  "status": "ok",
  "message": {
    "total-results": 2,
    "items": [
      {
        "title": ["Deep learning"],
        "author": [
          {"given": "Yann", "family": "LeCun"},
          {"given": "Yoshua", "family": "Bengio"},
          {"given": "Geoffrey", "family": "Hinton"}
        ],
        "published-print": {"date-parts": [[2015, 5, 28]]},
        "published-online": {"date-parts": [[2015, 5, 27]]},
        "DOI": "10.1038/nature14539",
        "container-title": ["Nature"],
        "volume": "521",
        "issue": "7553",
        "page": "436-444",
        "publisher": "Springer Science and Business Media LLC",
        "type": "journal-article",
        "URL": "https://doi.org/10.1038/nature14539"
      },
      {
        "title": ["Deep learning in neural networks: An overview"],
        "author": [{"given": "Jürgen", "family": "Schmidhuber"}],
        "published-online": {"date-parts": [[2014, 10, 13]]},
        "DOI": "10.1016/j.neunet.2014.09.003",
        "type": "journal-article"
      }
    ]
  }
}"#;

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>arXiv Query Results</title>
  <id>http://arxiv.org/api/query</id>
  <updated>2023-01-20T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All You Need</title>
    <summary>The dominant sequence transduction models are based on complex recurrent networks.</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
  </entry>
</feed>"#;

const CROSSREF_WORK: &str = r#"{
  "status": "ok",
  "message": {
    "title": ["Deep learning"],
    "author": [{"given": "Yann", "family": "LeCun"}],
    "published-print": {"date-parts": [[2015, 5, 28]]},
    "DOI": "10.1038/nature14539",
    "container-title": ["Nature"],
    "type": "journal-article",
    "abstract": "<jats:p>Deep learning allows computational models.</jats:p>"
  }
}"#;

/// A configuration whose endpoints all point at the mock server
fn config_for(server: &ServerGuard) -> Config {
    let mut config = Config::default();
    config.contact_email = "tests@example.org".to_string();
    config.endpoints.crossref = server.url();
    config.endpoints.arxiv = format!("{}/api/query", server.url());
    config.endpoints.dblp = format!("{}/search/publ/api", server.url());
    config.endpoints.unpaywall = format!("{}/v2", server.url());
    config
}

#[test]
fn test_all_sources_registered() {
    let registry = SourceRegistry::from_config(&Config::default()).unwrap();
    assert_eq!(registry.len(), 3);

    for source_type in SourceType::SEARCH_ORDER {
        let source = registry.get(source_type).unwrap();
        assert_eq!(source.id(), source_type.id());
        assert!(source.capabilities().contains(SourceCapabilities::SEARCH));
    }
}

#[tokio::test]
async fn test_search_crossref_then_arxiv_and_render() {
    let mut server = Server::new_async().await;
    let crossref = server
        .mock("GET", "/works")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "deep learning".into()),
            Matcher::UrlEncoded("rows".into(), "5".into()),
            Matcher::UrlEncoded("mailto".into(), "tests@example.org".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CROSSREF_SEARCH)
        .create_async()
        .await;
    let arxiv = server
        .mock("GET", "/api/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "all:deep learning".into()),
            Matcher::UrlEncoded("max_results".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(ARXIV_FEED)
        .create_async()
        .await;
    let dblp = server
        .mock("GET", "/search/publ/api")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let registry = SourceRegistry::from_config(&config_for(&server)).unwrap();
    let query = SearchQuery::new("deep learning").max_results(5);
    let records = registry
        .aggregate(&query, &[SourceType::Arxiv, SourceType::CrossRef])
        .await;

    crossref.assert_async().await;
    arxiv.assert_async().await;
    dblp.assert_async().await;

    let sources: Vec<Option<SourceType>> = records.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![
            Some(SourceType::CrossRef),
            Some(SourceType::CrossRef),
            Some(SourceType::Arxiv)
        ]
    );

    let nature = &records[0];
    assert_eq!(nature.title.as_deref(), Some("Deep learning"));
    assert_eq!(nature.authors[2], "Geoffrey Hinton");
    assert_eq!(nature.year, Some(2015));
    assert_eq!(records[1].year, Some(2014));

    let attention = &records[2];
    assert_eq!(attention.arxiv_id.as_deref(), Some("1706.03762v7"));
    assert_eq!(attention.year, Some(2017));

    let bibtex = to_bibtex(nature, None);
    assert!(bibtex.starts_with("@article{LeCun2015Deep-learning,\n"));
    assert!(bibtex.contains("  author = {Yann LeCun and Yoshua Bengio and Geoffrey Hinton},\n"));
    assert!(bibtex.contains("  number = {7553},\n"));
    assert!(bibtex.ends_with("  publisher = {Springer Science and Business Media LLC}\n}"));

    let org = to_orgmode(attention, 1);
    assert!(org.starts_with("* Attention Is All You Need\n"));
    assert!(org.contains(":ARXIV_URL: https://arxiv.org/abs/1706.03762v7\n"));
    assert!(org.ends_with("based on complex recurrent networks."));

    // JSON output feeds back into the renderer unchanged
    let json = serde_json::to_string_pretty(&records).unwrap();
    let parsed: Vec<biblio::Record> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);
    let rendered = format_citations(&parsed, CitationStyle::Bibtex, &FormatOptions::default());
    assert_eq!(rendered.matches("\n}\n\n@").count(), 2);
}

#[tokio::test]
async fn test_failing_source_does_not_abort_search() {
    let mut server = Server::new_async().await;
    let _crossref = server
        .mock("GET", "/works")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let _arxiv = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ARXIV_FEED)
        .create_async()
        .await;
    let _dblp = server
        .mock("GET", "/search/publ/api")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("this is not json")
        .create_async()
        .await;

    let registry = SourceRegistry::from_config(&config_for(&server)).unwrap();
    let records = registry
        .aggregate(&SearchQuery::new("attention"), &SourceType::SEARCH_ORDER)
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, Some(SourceType::Arxiv));
}

#[tokio::test]
async fn test_doi_lookup_found_and_missing() {
    let mut server = Server::new_async().await;
    let _found = server
        .mock("GET", "/works/10.1038/nature14539")
        .with_status(200)
        .with_body(CROSSREF_WORK)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/works/10.9999/missing")
        .with_status(404)
        .with_body("Resource not found.")
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/works/10.9999/broken")
        .with_status(500)
        .create_async()
        .await;

    let registry = SourceRegistry::from_config(&config_for(&server)).unwrap();
    let crossref = registry.get_required(SourceType::CrossRef).unwrap();

    let record = crossref
        .get_by_doi("https://doi.org/10.1038/nature14539")
        .await
        .unwrap();
    assert_eq!(record.journal.as_deref(), Some("Nature"));
    assert!(record.r#abstract.is_some());

    let missing = crossref.get_by_doi("doi:10.9999/missing").await.unwrap_err();
    assert!(matches!(missing, SourceError::NotFound(_)));
    assert_eq!(
        doi_error_message("10.9999/missing", &missing),
        "DOI not found: 10.9999/missing"
    );

    let broken = crossref.get_by_doi("10.9999/broken").await.unwrap_err();
    assert!(!matches!(broken, SourceError::NotFound(_)));
    assert!(doi_error_message("10.9999/broken", &broken).starts_with("Error looking up DOI: "));
}

#[tokio::test]
async fn test_open_access_check() {
    let mut server = Server::new_async().await;
    let unpaywall = server
        .mock("GET", "/v2/10.1038/nature14539")
        .match_query(Matcher::UrlEncoded(
            "email".into(),
            "tests@example.org".into(),
        ))
        .with_status(200)
        .with_body(
            r#"{"is_oa": true, "best_oa_location": {"url_for_pdf": "https://europepmc.org/paper.pdf", "host_type": "repository"}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = UnpaywallClient::from_config(&config_for(&server)).unwrap();

    let arxiv = client.check_open_access(None, Some("1706.03762")).await;
    assert!(arxiv.is_open_access);
    assert_eq!(
        arxiv.pdf_url.as_deref(),
        Some("https://arxiv.org/pdf/1706.03762.pdf")
    );

    let doi = client
        .check_open_access(Some("10.1038/nature14539"), None)
        .await;
    assert!(doi.is_open_access);
    assert_eq!(doi.source.as_deref(), Some("repository"));

    unpaywall.assert_async().await;

    let json = serde_json::to_value(&doi).unwrap();
    assert_eq!(json["pdf_url"], "https://europepmc.org/paper.pdf");
}
