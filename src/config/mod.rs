//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `BIBLIO_*` environment variables (nested keys use `__`, e.g.
//! `BIBLIO_TIMEOUTS__METADATA_SECS=10`).
//!
//! ```toml
//! contact_email = "you@example.org"
//!
//! [endpoints]
//! crossref = "https://api.crossref.org"
//! arxiv = "http://export.arxiv.org/api/query"
//! dblp = "https://dblp.org/search/publ/api"
//! unpaywall = "https://api.unpaywall.org/v2"
//!
//! [timeouts]
//! metadata_secs = 30
//! download_secs = 60
//! extract_secs = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Contact address sent to CrossRef (polite pool) and Unpaywall
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// API endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Request timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contact_email: default_contact_email(),
            endpoints: EndpointConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

fn default_contact_email() -> String {
    "user@example.com".to_string()
}

/// Base URLs for the external APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_crossref")]
    pub crossref: String,

    #[serde(default = "default_arxiv")]
    pub arxiv: String,

    #[serde(default = "default_dblp")]
    pub dblp: String,

    #[serde(default = "default_unpaywall")]
    pub unpaywall: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            crossref: default_crossref(),
            arxiv: default_arxiv(),
            dblp: default_dblp(),
            unpaywall: default_unpaywall(),
        }
    }
}

fn default_crossref() -> String {
    "https://api.crossref.org".to_string()
}

fn default_arxiv() -> String {
    "http://export.arxiv.org/api/query".to_string()
}

fn default_dblp() -> String {
    "https://dblp.org/search/publ/api".to_string()
}

fn default_unpaywall() -> String {
    "https://api.unpaywall.org/v2".to_string()
}

/// Timeout configuration (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Metadata lookups (search, DOI, open access)
    #[serde(default = "default_metadata_secs")]
    pub metadata_secs: u64,

    /// PDF downloads
    #[serde(default = "default_download_secs")]
    pub download_secs: u64,

    /// External text extraction
    #[serde(default = "default_extract_secs")]
    pub extract_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            metadata_secs: default_metadata_secs(),
            download_secs: default_download_secs(),
            extract_secs: default_extract_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn metadata(&self) -> Duration {
        Duration::from_secs(self.metadata_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    pub fn extract(&self) -> Duration {
        Duration::from_secs(self.extract_secs)
    }
}

fn default_metadata_secs() -> u64 {
    30
}

fn default_download_secs() -> u64 {
    60
}

fn default_extract_secs() -> u64 {
    10
}

/// Load configuration from an optional file plus `BIBLIO_*` environment variables
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("BIBLIO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a configuration file in the default locations
///
/// Checks `<config dir>/biblio/config.toml`, then `./biblio.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        dirs::config_dir().map(|dir| dir.join("biblio").join("config.toml")),
        Some(PathBuf::from("biblio.toml")),
    ];

    candidates.into_iter().flatten().find(|path| path.is_file())
}
