use reqwest::{header::HeaderMap, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OwnedSemaphorePermit;

use crate::{PagerDutyError, Result};

/// Successful response that keeps its connection slot until the body is read
/// or the value is dropped.
#[derive(Debug)]
pub struct PagerDutyResponse {
    inner: reqwest::Response,
    _permit: OwnedSemaphorePermit,
}

impl PagerDutyResponse {
    pub(crate) fn new(inner: reqwest::Response, permit: OwnedSemaphorePermit) -> Self {
        Self {
            inner,
            _permit: permit,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(PagerDutyError::Transport)
    }

    pub async fn bytes(self) -> Result<Vec<u8>> {
        let body = self.inner.bytes().await.map_err(PagerDutyError::Transport)?;
        Ok(body.to_vec())
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        self.inner.json().await.map_err(PagerDutyError::Transport)
    }
}
