//! Dataset loader.
//!
//! Fetches the passenger CSV from a URL or reads it from disk, then hands the
//! bytes to [`crate::parser`]. One attempt per call, bounded by the HTTP
//! client timeout. Nothing is cached between calls.
//!
//! ```rust,ignore
//! use titanic::loader::load_data;
//!
//! let table = load_data(None)?; // canonical URL
//! println!("{} passengers", table.len());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::{Config, DEFAULT_DATA_URL};
use crate::error::{DataSourceError, DataSourceResult};
use crate::models::PassengerTable;
use crate::parser::{parse_bytes_auto, ParseResult};

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// `http://` or `https://` URL.
    Url(String),
    /// Local file path.
    File(PathBuf),
}

impl DataSource {
    /// Interpret a locator string.
    ///
    /// HTTP(S) URLs are fetched; `file://` URLs and everything else are
    /// treated as local paths.
    pub fn parse(locator: &str) -> Self {
        let locator = locator.trim();
        let lower = locator.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(locator.to_string())
        } else if lower.starts_with("file://") {
            DataSource::File(PathBuf::from(&locator["file://".len()..]))
        } else {
            DataSource::File(PathBuf::from(locator))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Url(DEFAULT_DATA_URL.to_string())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => f.write_str(url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads passenger tables.
#[derive(Debug, Clone)]
pub struct Loader {
    timeout: Duration,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Loader {
    pub fn new(config: &Config) -> Self {
        Self {
            timeout: config.fetch_timeout,
        }
    }

    /// Fetch and parse, keeping parse metadata.
    pub fn load(&self, source: &DataSource) -> DataSourceResult<ParseResult> {
        info!(source = %source, "loading passenger data");

        let bytes = self.fetch(source)?;
        debug!(bytes = bytes.len(), "payload received");

        let result = parse_bytes_auto(&bytes)?;
        info!(
            rows = result.table.len(),
            known_ages = result.table.known_age_count(),
            encoding = %result.encoding,
            delimiter = ?result.delimiter,
            "passenger data loaded"
        );
        Ok(result)
    }

    /// Fetch and parse into a table.
    pub fn load_table(&self, source: &DataSource) -> DataSourceResult<PassengerTable> {
        self.load(source).map(|r| r.table)
    }

    fn fetch(&self, source: &DataSource) -> DataSourceResult<Vec<u8>> {
        match source {
            DataSource::Url(url) => self.fetch_url(url),
            DataSource::File(path) => std::fs::read(path).map_err(|e| DataSourceError::Io {
                path: path.clone(),
                source: e,
            }),
        }
    }

    fn fetch_url(&self, url: &str) -> DataSourceResult<Vec<u8>> {
        let unreachable = |e: reqwest::Error| DataSourceError::Unreachable {
            locator: url.to_string(),
            source: e,
        };

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(unreachable)?;

        let response = client.get(url).send().map_err(unreachable)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpStatus {
                locator: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(unreachable)?;
        Ok(body.to_vec())
    }
}

/// Load the dataset from `locator`, or from the canonical URL when `None`.
pub fn load_data(locator: Option<&str>) -> DataSourceResult<PassengerTable> {
    let source = locator.map(DataSource::parse).unwrap_or_default();
    Loader::default().load_table(&source)
}
