//! # Secrets API Client
//!
//! Thin HTTP client for the secrets API used by `passwortctl`.
//!
//! Every call is independent: build the URL, attach `Authorization: Bearer <token>`,
//! send one request, return status and body text. There is no retry, no
//! timeout beyond reqwest's defaults and no shared state between calls.
//! Turning a response into user-facing text is the job of [`render`].

pub mod render;

use paths::Segments;
use reqwest::{Method, StatusCode, Url};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

pub use render::{render, RequestKind};

/// Client construction errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Status and body text of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Secrets API client bound to one base URL and one token
#[derive(Debug, Clone)]
pub struct SecretsClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl SecretsClient {
    /// Create a client for `api_url` (e.g. `http://localhost:8080/api/v1`)
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be parsed or cannot carry a path.
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self, ClientError> {
        let base = Url::parse(api_url).map_err(|e| ClientError::InvalidUrl {
            url: api_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: api_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("passwortctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    /// Build the URL for an operation; the key is escaped as a single path segment
    pub fn url(&self, segments: Segments<'_>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments.to_vec());
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        segments: Segments<'_>,
        body: Option<Value>,
    ) -> Result<ApiResponse, reqwest::Error> {
        let url = self.url(segments);
        debug!("{} {}", method, segments.display_path());

        let mut request = self.http.request(method, url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("-> {}", status);
        Ok(ApiResponse { status, body })
    }

    /// `POST /secrets` with `{"key", "value"}`; empty strings are sent as-is
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn set(&self, key: &str, value: &str) -> Result<ApiResponse, reqwest::Error> {
        let body = json!({ "key": key, "value": value });
        self.send(Method::POST, Segments::Secrets, Some(body)).await
    }

    /// `GET /secrets/{key}`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn get(&self, key: &str) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::GET, Segments::Secret(key), None).await
    }

    /// `DELETE /secrets/{key}`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn delete(&self, key: &str) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::DELETE, Segments::Secret(key), None).await
    }

    /// `GET /secrets`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn list(&self) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::GET, Segments::Secrets, None).await
    }

    /// `POST /sys/init`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn init(&self) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::POST, Segments::Init, None).await
    }

    /// `POST /sys/seal`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn seal(&self) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::POST, Segments::Seal, None).await
    }

    /// `POST /sys/unseal` with `{"shares": [...]}`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn unseal(&self, shares: &[String]) -> Result<ApiResponse, reqwest::Error> {
        let body = json!({ "shares": shares });
        self.send(Method::POST, Segments::Unseal, Some(body)).await
    }

    /// `GET /sys/status`
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be completed.
    pub async fn status(&self) -> Result<ApiResponse, reqwest::Error> {
        self.send(Method::GET, Segments::Status, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SecretsClient {
        SecretsClient::new(base, "token").unwrap()
    }

    #[test]
    fn test_url_for_collection_and_item() {
        let c = client("http://localhost:8080/api/v1");
        assert_eq!(
            c.url(Segments::Secrets).as_str(),
            "http://localhost:8080/api/v1/secrets"
        );
        assert_eq!(
            c.url(Segments::Secret("foo")).as_str(),
            "http://localhost:8080/api/v1/secrets/foo"
        );
        assert_eq!(
            c.url(Segments::Unseal).as_str(),
            "http://localhost:8080/api/v1/sys/unseal"
        );
    }

    #[test]
    fn test_url_tolerates_trailing_slash() {
        let c = client("http://localhost:8080/api/v1/");
        assert_eq!(
            c.url(Segments::Secret("foo")).as_str(),
            "http://localhost:8080/api/v1/secrets/foo"
        );
    }

    #[test]
    fn test_key_is_escaped_as_one_segment() {
        let c = client("http://localhost:8080/api/v1");
        assert_eq!(
            c.url(Segments::Secret("a/b c")).as_str(),
            "http://localhost:8080/api/v1/secrets/a%2Fb%20c"
        );
    }

    #[test]
    fn test_empty_key_keeps_trailing_segment() {
        let c = client("http://localhost:8080/api/v1");
        assert_eq!(
            c.url(Segments::Secret("")).as_str(),
            "http://localhost:8080/api/v1/secrets/"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(matches!(
            SecretsClient::new("not a url", ""),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            SecretsClient::new("mailto:someone@example.com", ""),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
