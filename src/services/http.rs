use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{Catalog, CatalogEntry, Resource, ResourceObject};
use crate::services::WrapSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    // Connection refused, DNS, reset...
    #[error("{0}")]
    Transport(String),
    // Non-2xx. `message` is the body text when there was one.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Blocking HTTP client for the wrap backend. One attempt per call, no timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(format!(
                "{base_url}: cannot be used as a base"
            )));
        }
        let client = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, base_url })
    }

    /// `<base>/<segments...>`, each segment escaped as one path segment.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            for seg in segments {
                path.push(seg);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let response = check_status(response)?;
        response
            .json::<T>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(status_error(status.as_u16(), status.canonical_reason(), &body))
}

pub(crate) fn status_error(status: u16, reason: Option<&str>, body: &str) -> FetchError {
    let body = body.trim_end();
    let message = if !body.is_empty() {
        body.to_string()
    } else {
        match reason {
            Some(r) => format!("HTTP {status} {r}"),
            None => format!("HTTP {status}"),
        }
    };
    FetchError::Status { status, message }
}

impl WrapSource for HttpClient {
    fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        let catalog: Catalog = self.get_json(self.url_for(&["wraps"])?)?;
        Ok(catalog.wraps)
    }

    fn fetch_resources(&self, wrap: &str) -> Result<Vec<Resource>, FetchError> {
        let objs: Vec<ResourceObject> = self.get_json(self.url_for(&["resources", wrap])?)?;
        Ok(objs.into_iter().map(Resource::from).collect())
    }
}
