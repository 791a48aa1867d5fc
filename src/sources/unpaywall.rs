//! Unpaywall open-access lookup.
//!
//! Uses the Unpaywall API for checking open access status of papers.
//! API documentation: <https://unpaywall.org/products/api>
//!
//! arXiv preprints are always open access, so a check that carries an arXiv
//! identifier is answered locally without any request.

use serde::Deserialize;
use std::sync::Arc;

use crate::config::Config;
use crate::models::OpenAccessResult;
use crate::sources::{check_status, clean_doi, SourceError, ARXIV_PDF_URL};
use crate::utils::HttpClient;

/// Unpaywall API client
///
/// The API requires a contact email address (free, no key needed).
#[derive(Debug, Clone)]
pub struct UnpaywallClient {
    client: Arc<HttpClient>,
    base_url: String,
    email: String,
}

impl UnpaywallClient {
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::with_timeout(config.timeouts.metadata())?;
        Ok(Self::with_client(
            Arc::new(client),
            &config.endpoints.unpaywall,
            &config.contact_email,
        ))
    }

    pub fn with_client(client: Arc<HttpClient>, base_url: &str, email: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
        }
    }

    /// Check whether a paper is open access.
    ///
    /// An arXiv id wins over a DOI. Lookup failures are logged and reported
    /// as "not open access".
    pub async fn check_open_access(
        &self,
        doi: Option<&str>,
        arxiv_id: Option<&str>,
    ) -> OpenAccessResult {
        if let Some(arxiv_id) = arxiv_id.map(str::trim).filter(|id| !id.is_empty()) {
            return arxiv_open_access(arxiv_id);
        }

        let Some(doi) = doi else {
            return OpenAccessResult::closed();
        };

        match self.lookup(doi).await {
            Ok(response) => response.into_result(),
            Err(e) => {
                tracing::warn!(doi, error = %e, "Error checking Unpaywall");
                OpenAccessResult::closed()
            }
        }
    }

    async fn lookup(&self, doi: &str) -> Result<UnpaywallResponse, SourceError> {
        let doi = clean_doi(doi);
        let url = format!(
            "{}/{}?email={}",
            self.base_url,
            doi,
            urlencoding::encode(&self.email)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query Unpaywall: {}", e)))?;

        check_status(response, "Unpaywall")?
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse Unpaywall response: {}", e)))
    }
}

/// Open-access answer for an arXiv preprint
pub fn arxiv_open_access(arxiv_id: &str) -> OpenAccessResult {
    OpenAccessResult {
        is_open_access: true,
        pdf_url: Some(format!("{}/{}.pdf", ARXIV_PDF_URL, arxiv_id)),
        source: Some("arXiv".to_string()),
    }
}

/// Unpaywall API response
#[derive(Debug, Default, Deserialize)]
struct UnpaywallResponse {
    #[serde(default)]
    is_oa: bool,
    best_oa_location: Option<UnpaywallLocation>,
    first_oa_location: Option<UnpaywallLocation>,
}

#[derive(Debug, Clone, Deserialize)]
struct UnpaywallLocation {
    url_for_pdf: Option<String>,
    host_type: Option<String>,
}

impl UnpaywallResponse {
    fn into_result(self) -> OpenAccessResult {
        if !self.is_oa {
            return OpenAccessResult::closed();
        }

        let mut result = OpenAccessResult {
            is_open_access: true,
            ..OpenAccessResult::closed()
        };

        // Preference order: best location, then first location
        let location = [self.best_oa_location, self.first_oa_location]
            .into_iter()
            .flatten()
            .next();

        if let Some(UnpaywallLocation {
            url_for_pdf: Some(pdf_url),
            host_type,
        }) = location
        {
            result.pdf_url = Some(pdf_url);
            result.source = Some(host_type.unwrap_or_else(|| "Unknown".to_string()));
        }

        result
    }
}
