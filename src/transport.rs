use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Minimal transport abstraction over HTTP GET with a bounded wait.
///
/// Fetchers depend on this trait rather than on a concrete client so that
/// tests can substitute canned responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a URL with query parameters and parse the body as JSON.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError>;

    /// GET a URL with query parameters and return the raw body text.
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError>;

    /// GET with an optional bearer token. Implementations without auth
    /// support may ignore the token.
    async fn get_json_auth(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<Value, TransportError> {
        let _ = bearer;
        self.get_json(url, query).await
    }
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with a per-request timeout. A client without the
    /// timeout is never substituted; a build failure is a hard error.
    pub fn new(timeout_seconds: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }

    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, TransportError> {
        debug!("GET {}", url);
        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        let response = self.get(url, query, None).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidJson(e.to_string()))
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
        let response = self.get(url, query, None).await?;
        Ok(response.text().await?)
    }

    async fn get_json_auth(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<Value, TransportError> {
        let response = self.get(url, query, bearer).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidJson(e.to_string()))
    }
}
