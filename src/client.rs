use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

use crate::catalog::{Catalog, DEFAULT_BASE_URL};
use crate::config::load_config;
use crate::decode::{decompress_or_plain, is_html_response};
use crate::error::{CatalogError, FetchError};
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://BioPortal.salud.gov.pr/api/administration`.
    pub url: String,
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Overall deadline for a request, body included.
    ///
    /// `None` leaves the read phase unbounded; only the connect timeout applies.
    pub timeout: Option<Duration>,
    /// Whether to verify TLS certificates.
    pub verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(30),
            timeout: None,
            verify: true,
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body bytes after Brotli decoding (or as sent, if not compressed).
    Raw(Vec<u8>),
    /// Body parsed as JSON and flattened.
    Table(Table),
}

impl Payload {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Payload::Table(t) => Some(t),
            Payload::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Payload::Raw(b) => Some(b.as_slice()),
            Payload::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Payload::Table(t) => Some(t),
            Payload::Raw(_) => None,
        }
    }
}

/// Outcome of a download whose dataset name was valid.
pub type DownloadResult<'a> = std::result::Result<&'a Payload, FetchError>;

/// Client for the BioPortal reporting API.
///
/// Requests are blocking and issued one per call. The client keeps the last
/// successfully downloaded payload; it is replaced on every successful
/// [`Client::download`] and left as it was when a download fails. Callers that
/// share a client across threads must synchronize access themselves.
#[derive(Debug, Clone)]
pub struct Client {
    catalog: Catalog,
    progress: bool,
    http: HttpClient,
    last: Option<Payload>,
}

impl Client {
    /// Creates a client using environment variables.
    ///
    /// This is equivalent to `Client::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `url`/`verify` arguments
    /// - environment variables `BIOPORTAL_URL` / `BIOPORTAL_VERIFY`
    /// - built-in defaults
    ///
    /// Timeouts come from `BIOPORTAL_CONNECT_TIMEOUT` and `BIOPORTAL_TIMEOUT`.
    pub fn new(url: Option<String>, verify: Option<bool>) -> Result<Self> {
        let cfg = load_config(url, verify)?;
        Self::from_config(cfg)
    }

    /// Creates a client serving the built-in BioPortal catalog under `cfg.url`.
    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        let catalog = Catalog::bioportal(&cfg.url);
        Self::with_catalog(catalog, cfg)
    }

    pub fn with_catalog(catalog: Catalog, cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("bioportal-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("bioportal-rs")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .connect_timeout(cfg.connect_timeout)
            .timeout(cfg.timeout);

        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            catalog,
            progress: true,
            http,
            last: None,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Names of the downloadable datasets, in catalog order.
    pub fn list_datasets(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Prints the numbered dataset list to stdout.
    pub fn print_datasets(&self) {
        print!("{}", self.catalog);
    }

    /// The payload of the last successful download, if any.
    pub fn last_result(&self) -> Option<&Payload> {
        self.last.as_ref()
    }

    /// Downloads a catalog dataset as a [`Table`].
    ///
    /// The outer `Err` means the name is not a downloadable catalog entry and
    /// nothing was requested. The inner result is the outcome of the fetch.
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// let mut client = bioportal::Client::from_env()?;
    /// match client.download("Casos por region")? {
    ///     Ok(payload) => println!("{}", payload.as_table().map(|t| t.len()).unwrap_or(0)),
    ///     Err(e) => eprintln!("{e}"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn download(
        &mut self,
        name: &str,
    ) -> std::result::Result<DownloadResult<'_>, CatalogError> {
        self.download_as(name, true)
    }

    /// Like [`Client::download`], keeping the decoded body as bytes.
    pub fn download_raw(
        &mut self,
        name: &str,
    ) -> std::result::Result<DownloadResult<'_>, CatalogError> {
        self.download_as(name, false)
    }

    fn download_as(
        &mut self,
        name: &str,
        want_table: bool,
    ) -> std::result::Result<DownloadResult<'_>, CatalogError> {
        let url = self.catalog.resolve(name)?;
        tracing::info!(dataset = name, %url, "downloading dataset");

        let pb = self.spinner(name);
        let result = self.fetch(&url, want_table);

        match result {
            Ok(payload) => {
                if let Some(pb) = pb {
                    pb.finish_with_message(format!("Downloaded \"{}\".", name));
                }
                match &payload {
                    Payload::Table(t) => tracing::info!(
                        dataset = name,
                        rows = t.len(),
                        columns = t.columns().len(),
                        "downloaded"
                    ),
                    Payload::Raw(b) => {
                        tracing::info!(dataset = name, bytes = b.len(), "downloaded")
                    }
                }
                let payload: &Payload = self.last.insert(payload);
                Ok(Ok(payload))
            }
            Err(e) => {
                if let Some(pb) = pb {
                    pb.abandon_with_message(format!("Failed to download \"{}\".", name));
                }
                tracing::warn!(dataset = name, error = %e, "download failed");
                Ok(Err(e))
            }
        }
    }

    /// Fetches `url` and decodes the body.
    ///
    /// With `want_table` the body is parsed as JSON and flattened, otherwise
    /// the decoded bytes are returned. Client state is not touched.
    pub fn fetch(&self, url: &str, want_table: bool) -> std::result::Result<Payload, FetchError> {
        let resp = self
            .http
            .get(url)
            .header(ACCEPT_ENCODING, "br")
            .send()
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        tracing::debug!(url, %status, "response received");
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp
            .bytes()
            .map_err(|e| FetchError::from_reqwest(url, e))?
            .to_vec();

        if is_html_response(content_type.as_deref(), &body) {
            return Err(FetchError::UnexpectedHtmlResponse {
                url: url.to_string(),
            });
        }

        let body = decompress_or_plain(body);
        if !want_table {
            return Ok(Payload::Raw(body));
        }

        let doc: Value =
            serde_json::from_slice(&body).map_err(|source| FetchError::MalformedPayload {
                url: url.to_string(),
                source,
            })?;

        Ok(Payload::Table(Table::from_json(&doc)))
    }

    fn spinner(&self, name: &str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Downloading \"{}\"...", name));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}
