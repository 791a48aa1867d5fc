use anyhow::{Context, Result};
use biblio::config::{find_config_file, load_config, Config};
use biblio::models::{Record, SearchQuery, SourceType};
use biblio::sources::{clean_doi, Source, SourceRegistry, UnpaywallClient};
use biblio::utils::{
    doi_error_message, download_pdf, extract_doi_from_pdf, format_citations,
    format_record_simple, format_search_simple, CitationStyle, FormatOptions, PdfError,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Biblio - Search, resolve and format bibliographic references
#[derive(Parser, Debug)]
#[command(name = "biblio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Search, resolve and format bibliographic references", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for lookup results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Pretty-printed JSON (machine-readable)
    Json,
    /// Plain text summary
    Simple,
}

/// Sources to search
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SourceArg {
    #[value(name = "crossref")]
    CrossRef,
    #[value(name = "arxiv")]
    Arxiv,
    #[value(name = "dblp")]
    Dblp,
    #[value(name = "all")]
    All,
}

/// Citation format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// BibTeX entries
    Bibtex,
    /// org-mode headings with property drawers
    Orgmode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search CrossRef, arXiv and DBLP
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Source to search
        #[arg(long, value_enum, default_value_t = SourceArg::All)]
        source: SourceArg,

        /// Maximum number of results per source
        #[arg(long, default_value_t = 10)]
        max_results: usize,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Look up bibliographic information by DOI
    Doi {
        /// Digital Object Identifier (bare, `doi:` or resolver URL)
        doi: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },

    /// Format records as BibTeX or org-mode
    Format {
        /// Output format
        #[arg(long, value_enum)]
        format: FormatArg,

        /// Input JSON file with one record or an array of records (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Citation key to use for BibTeX instead of a generated one
        #[arg(long)]
        citation_key: Option<String>,

        /// Heading level for org-mode output
        #[arg(long, default_value_t = 2)]
        level: usize,
    },

    /// PDF operations
    Pdf {
        #[command(subcommand)]
        command: PdfCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PdfCommands {
    /// Check whether a paper is open access
    Check {
        /// DOI to check
        #[arg(long)]
        doi: Option<String>,

        /// arXiv identifier to check
        #[arg(long)]
        arxiv: Option<String>,
    },

    /// Download a PDF
    Download {
        /// URL of the PDF
        url: String,

        /// Output file path
        output: PathBuf,
    },

    /// Extract the DOI printed in a PDF
    ExtractDoi {
        /// Path to the PDF file
        pdf: PathBuf,
    },
}

impl SourceArg {
    fn selection(self) -> Vec<SourceType> {
        match self {
            SourceArg::CrossRef => vec![SourceType::CrossRef],
            SourceArg::Arxiv => vec![SourceType::Arxiv],
            SourceArg::Dblp => vec![SourceType::Dblp],
            SourceArg::All => SourceType::SEARCH_ORDER.to_vec(),
        }
    }
}

impl From<FormatArg> for CitationStyle {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Bibtex => CitationStyle::Bibtex,
            FormatArg::Orgmode => CitationStyle::OrgMode,
        }
    }
}

fn log_filter(verbose: u8, quiet: bool) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    };
    format!("biblio={}", level)
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).or_else(find_config_file);

    if let Some(path) = &path {
        tracing::debug!("Using config file: {}", path.display());
    }

    load_config(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })
}

/// Parse a single record or an array of records
fn parse_records(input: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value =
        serde_json::from_str(input).context("Input is not valid JSON")?;

    let records = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value),
        other => serde_json::from_value(other).map(|record| vec![record]),
    };

    records.context("Input does not contain bibliographic records")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_search(
    config: &Config,
    query: String,
    source: SourceArg,
    max_results: usize,
    output: OutputFormat,
) -> Result<ExitCode> {
    let registry = SourceRegistry::from_config(config)?;
    let search_query = SearchQuery::new(query).max_results(max_results);
    let records = registry.aggregate(&search_query, &source.selection()).await;

    tracing::info!(count = records.len(), "Search finished");

    match output {
        OutputFormat::Json => print_json(&records)?,
        OutputFormat::Simple => print!("{}", format_search_simple(&records)),
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_doi(config: &Config, doi: &str, output: OutputFormat) -> Result<ExitCode> {
    let registry = SourceRegistry::from_config(config)?;
    let resolver = registry.doi_source()?;

    match resolver.get_by_doi(doi).await {
        Ok(record) => {
            match output {
                OutputFormat::Json => print_json(&record)?,
                OutputFormat::Simple => print!("{}", format_record_simple(&record)),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", doi_error_message(&clean_doi(doi), &e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_format(
    format: FormatArg,
    input: Option<&Path>,
    citation_key: Option<String>,
    level: usize,
) -> Result<ExitCode> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            raw
        }
    };

    let records = parse_records(&raw)?;
    let options = FormatOptions { citation_key, level };
    println!("{}", format_citations(&records, format.into(), &options));

    Ok(ExitCode::SUCCESS)
}

async fn run_pdf_check(
    config: &Config,
    doi: Option<&str>,
    arxiv: Option<&str>,
) -> Result<ExitCode> {
    if doi.is_none() && arxiv.is_none() {
        eprintln!("Error: Must provide either --doi or --arxiv");
        return Ok(ExitCode::FAILURE);
    }

    let client = UnpaywallClient::from_config(config)?;
    let result = client.check_open_access(doi, arxiv).await;
    print_json(&result)?;

    Ok(ExitCode::SUCCESS)
}

async fn run_download(config: &Config, url: &str, output: &Path) -> Result<ExitCode> {
    match download_pdf(url, output, config.timeouts.download()).await {
        Ok(_) => {
            println!("Downloaded: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_extract_doi(config: &Config, pdf: &Path) -> Result<ExitCode> {
    match extract_doi_from_pdf(pdf, config.timeouts.extract()).await {
        Ok(Some(doi)) => {
            println!("{}", doi);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(None) => eprintln!("No DOI found"),
        Err(e @ PdfError::ToolNotFound) => eprintln!("{}", e),
        Err(e) => eprintln!("Error extracting DOI: {}", e),
    }

    Ok(ExitCode::FAILURE)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_filter(cli.verbose, cli.quiet)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            source,
            max_results,
            output,
        } => run_search(&config, query, source, max_results, output).await,

        Commands::Doi { doi, output } => run_doi(&config, &doi, output).await,

        Commands::Format {
            format,
            input,
            citation_key,
            level,
        } => run_format(format, input.as_deref(), citation_key, level),

        Commands::Pdf { command } => match command {
            PdfCommands::Check { doi, arxiv } => {
                run_pdf_check(&config, doi.as_deref(), arxiv.as_deref()).await
            }
            PdfCommands::Download { url, output } => run_download(&config, &url, &output).await,
            PdfCommands::ExtractDoi { pdf } => run_extract_doi(&config, &pdf).await,
        },
    }
}
