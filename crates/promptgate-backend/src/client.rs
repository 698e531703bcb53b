//! Backend client interface and HTTP implementation

use crate::error::{BackendError, Result};
use crate::payload::BackendPayload;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Async backend client trait
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Send one payload to the backend and return the raw response body
    ///
    /// Exactly one attempt is made; failures are never retried.
    async fn send(&self, payload: &BackendPayload) -> Result<Vec<u8>>;

    /// Get the name of this client
    fn name(&self) -> &str;
}

/// HTTP backend client (Ollama-style generate endpoint)
pub struct HttpBackendClient {
    api_url: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl HttpBackendClient {
    /// Create a new client for `api_url`
    ///
    /// `timeout` is a hard deadline covering connect, request and response body.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BackendError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn send(&self, payload: &BackendPayload) -> Result<Vec<u8>> {
        let body = payload.to_bytes()?;

        tracing::debug!(
            "Calling backend {} with model {:?}",
            self.api_url,
            payload.model()
        );

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
