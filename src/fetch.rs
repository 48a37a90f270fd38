//! Download the label PDF.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::error::{LabelError, Result};

/// Bytes of a downloaded document plus the name its URL suggests.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub bytes: Vec<u8>,
    /// Final path segment of the URL. Superseded by the content-derived
    /// name once the label is parsed.
    pub url_file_name: String,
}

/// Something that can GET a document.
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> Result<FetchedDocument>;
}

/// [`DocumentSource`] over a blocking reqwest client. Redirects follow the
/// client default; there are no retries.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl DocumentSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        debug!(url = %url, "Downloading label");
        let response = self.http.get(url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LabelError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes()?.to_vec();
        info!(url = %url, size = bytes.len(), "Downloaded label");
        Ok(FetchedDocument {
            url: url.to_string(),
            url_file_name: url_file_name(url),
            bytes,
        })
    }
}

/// Last `/`-separated segment of `url`, query included.
pub fn url_file_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}
