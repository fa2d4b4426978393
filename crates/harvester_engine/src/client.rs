use std::time::Duration;

use futures_util::StreamExt;
use url::Url;

use crate::{FailureKind, HttpReply, QueryError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Transport seam: one GET, returning status and body, or a transport failure.
///
/// Status classification happens in the executor, not here.
#[async_trait::async_trait]
pub trait AutocompleteClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpReply, QueryError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestClient {
    pub fn new(settings: ClientSettings) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| QueryError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }
}

#[async_trait::async_trait]
impl AutocompleteClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<HttpReply, QueryError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        // Content-Length may be absent, so the cap is also enforced per chunk.
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(HttpReply::new(status, body))
    }
}

fn too_large(max_bytes: u64, actual: u64) -> QueryError {
    QueryError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> QueryError {
    if err.is_timeout() {
        return QueryError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return QueryError::new(FailureKind::InvalidUrl, err.to_string());
    }
    QueryError::new(FailureKind::Network, err.to_string())
}
