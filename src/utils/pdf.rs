//! PDF download and DOI extraction utilities.
//!
//! Text extraction shells out to `pdftotext` from poppler-utils. Only the
//! first pages are read, since a paper's DOI is printed on its title page.
//! If the tool is missing, extraction fails with [`PdfError::ToolNotFound`].

use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::utils::http::{HttpClient, DOWNLOAD_USER_AGENT};

/// Number of leading pages searched for a DOI
pub const DOI_SEARCH_PAGES: u32 = 2;

/// `doi:` or `DOI:` prefixed identifier
static DOI_PREFIXED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)doi:\s*(10\.\d{4,}/\S+)").expect("DOI prefix regex is valid")
});

/// Bare identifier anywhere in the text
static DOI_BARE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(10\.\d{4,}/\S+)").expect("DOI regex is valid"));

/// Errors that can occur while downloading or reading PDFs
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("pdftotext not found. Install poppler-utils to extract DOI from PDFs.")]
    ToolNotFound,

    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract the text of the first `pages` pages of a PDF file.
///
/// Runs `pdftotext -l <pages> <pdf> -` and returns its standard output.
pub async fn extract_text(
    path: &Path,
    pages: u32,
    timeout: Duration,
) -> Result<String, PdfError> {
    if !path.is_file() {
        return Err(PdfError::InvalidFile(path.display().to_string()));
    }

    let child = Command::new("pdftotext")
        .arg("-l")
        .arg(pages.to_string())
        .arg(path)
        .arg("-")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfError::ToolNotFound,
            _ => PdfError::Io(e),
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            PdfError::ExtractionFailed(format!("pdftotext timed out after {:?}", timeout))
        })??;

    if !output.status.success() {
        // pdftotext still prints what it could read for damaged files
        tracing::debug!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "pdftotext exited with an error"
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Find the first DOI in a block of text.
///
/// A `doi:`-prefixed identifier wins over a bare one. Trailing sentence
/// punctuation (`.`, `,`, `;`) is stripped.
pub fn find_doi(text: &str) -> Option<String> {
    [&*DOI_PREFIXED_PATTERN, &*DOI_BARE_PATTERN]
        .into_iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';']).to_string())
}

/// Extract the DOI printed on the first pages of a PDF, if any
pub async fn extract_doi_from_pdf(
    path: &Path,
    timeout: Duration,
) -> Result<Option<String>, PdfError> {
    let text = extract_text(path, DOI_SEARCH_PAGES, timeout).await?;
    let doi = find_doi(&text);
    tracing::debug!(path = %path.display(), doi = ?doi, "DOI extraction finished");
    Ok(doi)
}

/// Download a PDF from `url` to `output`.
///
/// A response whose content type is not `application/pdf` is still saved,
/// with a warning. Returns the number of bytes written.
pub async fn download_pdf(
    url: &str,
    output: &Path,
    timeout: Duration,
) -> Result<u64, PdfError> {
    let client = HttpClient::with_user_agent(DOWNLOAD_USER_AGENT, timeout)
        .map_err(|e| PdfError::Download(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PdfError::Download(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PdfError::Download(format!(
            "HTTP Error {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !content_type.contains("application/pdf") {
        tracing::warn!(content_type = %content_type, "Content-Type is not PDF");
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfError::Download(format!("Failed to read download: {}", e)))?;

    tokio::fs::write(output, &bytes).await?;
    tracing::info!(path = %output.display(), bytes = bytes.len(), "PDF saved");

    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_find_doi_prefers_prefixed_form() {
        let text = "Cites 10.1111/other.2 in passing.\nDOI: 10.1145/3290605.3300857.\n";
        assert_eq!(find_doi(text).as_deref(), Some("10.1145/3290605.3300857"));
    }

    #[test]
    fn test_find_doi_bare_and_trailing_punctuation() {
        assert_eq!(
            find_doi("see https://doi.org/10.1038/nature14539;, more").as_deref(),
            Some("10.1038/nature14539")
        );
        assert_eq!(
            find_doi("doi:10.5555/12345678,").as_deref(),
            Some("10.5555/12345678")
        );
    }

    #[test]
    fn test_find_doi_none() {
        assert_eq!(find_doi("no identifiers here, only 10.12/short"), None);
        assert_eq!(find_doi(""), None);
    }

    #[tokio::test]
    async fn test_extract_nonexistent_file() {
        let result = extract_text(
            Path::new("/nonexistent/file.pdf"),
            DOI_SEARCH_PAGES,
            Duration::from_secs(10),
        )
        .await;
        assert!(matches!(result, Err(PdfError::InvalidFile(_))));
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/paper.pdf")
            .match_header("user-agent", DOWNLOAD_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4 fake")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("paper.pdf");
        let written = download_pdf(
            &format!("{}/paper.pdf", server.url()),
            &output,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(written, 13);
        assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn test_download_non_pdf_still_saved() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/landing")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("landing.pdf");
        download_pdf(
            &format!("{}/landing", server.url()),
            &output,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("denied.pdf");
        let err = download_pdf(
            &format!("{}/denied.pdf", server.url()),
            &output,
            Duration::from_secs(60),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Download error: HTTP Error 403: Forbidden");
        assert!(!output.exists());
    }
}
