use std::fmt::Debug;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ImageFetchError {
    #[error("image location '{0}' is not an http(s) url")]
    UnsupportedUrl(String),
    #[error("image request failed: {0}")]
    Transport(String),
    #[error("image request returned status {0}")]
    Status(u16),
    #[error("image fetching is disabled")]
    Disabled,
}

/// Source of document photos embedded into exported reports.
pub trait ImageSource: Debug + Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError>;
}

/// Blocking HTTP fetcher for the storage URLs kept on member records.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> Result<Self, ImageFetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ImageFetchError::Transport(err.to_string()))?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ImageFetchError::UnsupportedUrl(url.to_string()));
        }

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ImageFetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|err| ImageFetchError::Transport(err.to_string()))
    }
}

/// Never fetches; every photo renders as a placeholder box.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineImageSource;

impl ImageSource for OfflineImageSource {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageFetchError> {
        Err(ImageFetchError::Disabled)
    }
}
