#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Locates and downloads the MTR Bus data dictionary PDF.
//!
//! The dictionary is published as a resource of the MTR Bus ETA dataset
//! on data.gov.hk. Its file name changes with every revision, so the
//! current link is scraped from the dataset page ([`dataset_page`]) before
//! the PDF itself is downloaded.
//!
//! Requests are made once; there is no retry.

pub mod dataset_page;

pub use dataset_page::find_dictionary_pdf_url;

/// Dataset page listing the MTR Bus data dictionary.
pub const DEFAULT_DATASET_URL: &str =
    "https://data.gov.hk/en-data/dataset/mtr-mtr_bus-mtr-bus-eta-data";

/// User agent sent with every request. The portal rejects some
/// non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Errors that can occur while locating or downloading the dictionary.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL '{url}': {message}")]
    Url {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// A CSS selector failed to parse.
    #[error("Invalid CSS selector '{0}'")]
    Selector(String),

    /// The dataset page does not link to a data dictionary PDF.
    #[error("Could not find the data dictionary PDF link on {0}")]
    PdfNotFound(String),
}

/// The data dictionary's home on data.gov.hk.
#[derive(Debug, Clone)]
pub struct DictionarySource {
    /// URL of the dataset page that links to the PDF.
    dataset_url: String,
}

impl Default for DictionarySource {
    fn default() -> Self {
        Self::new(DEFAULT_DATASET_URL)
    }
}

impl DictionarySource {
    /// Creates a source for the given dataset page.
    #[must_use]
    pub fn new(dataset_url: &str) -> Self {
        Self {
            dataset_url: dataset_url.to_owned(),
        }
    }

    /// Returns the dataset page URL.
    #[must_use]
    pub fn dataset_url(&self) -> &str {
        &self.dataset_url
    }

    fn build_client() -> Result<reqwest::Client, ScrapeError> {
        reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(ScrapeError::Http)
    }

    /// Fetches the dataset page and returns the absolute URL of the data
    /// dictionary PDF.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the page cannot be fetched, or
    /// [`ScrapeError::PdfNotFound`] if it has no dictionary link.
    pub async fn fetch_pdf_url(&self) -> Result<String, ScrapeError> {
        let client = Self::build_client()?;

        log::info!("Fetching dataset page: {}", self.dataset_url);
        let body = client
            .get(&self.dataset_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let url = find_dictionary_pdf_url(&body, &self.dataset_url)?;
        log::info!("Found data dictionary PDF: {url}");
        Ok(url)
    }

    /// Downloads the PDF at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the download fails.
    pub async fn download_pdf(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let client = Self::build_client()?;

        log::info!("Downloading PDF from {url}");
        let bytes = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        log::debug!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Locates and downloads the current data dictionary PDF.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScrapeError`] from either step.
    pub async fn fetch_pdf(&self) -> Result<Vec<u8>, ScrapeError> {
        let url = self.fetch_pdf_url().await?;
        self.download_pdf(&url).await
    }
}
