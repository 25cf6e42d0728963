//! Backend seam: one question in, one answer string out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use thiserror::Error;

use crate::messages::{AskRequest, AskResponse, ASK_PATH};

/// Why a question did not produce an answer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never completed (connection refused, reset, timed out).
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned status {0}")]
    Status(u16),

    /// The body was not `{"response": <string>}`.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The backend itself failed without producing a response.
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("invalid backend url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Malformed(e.to_string())
    }
}

/// Anything that can answer a question.
///
/// The widget holds the backend behind an `Arc` and calls it from spawned
/// tasks, hence the `Send + Sync + 'static` bound.
#[async_trait]
pub trait AskBackend: Send + Sync + 'static {
    async fn ask(&self, question: &str) -> Result<String, ClientError>;
}

/// `POST {base_url}/ask` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Build a backend for `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, None)
    }

    /// Like [`HttpBackend::new`], with an optional per-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let endpoint = endpoint_for(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn endpoint_for(base_url: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    // `join` replaces the last path segment unless the base ends with '/'.
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", base.scheme())));
    }
    base.join(ASK_PATH).map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl AskBackend for HttpBackend {
    async fn ask(&self, question: &str) -> Result<String, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "sending question");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&AskRequest::new(question))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let answer = AskResponse::from_body(&body)?;
        Ok(answer.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_ask_path() {
        assert_eq!(
            endpoint_for("http://127.0.0.1:5000").unwrap().as_str(),
            "http://127.0.0.1:5000/ask"
        );
        assert_eq!(
            endpoint_for("https://example.com/chatbot/").unwrap().as_str(),
            "https://example.com/chatbot/ask"
        );
        assert_eq!(
            endpoint_for("https://example.com/chatbot").unwrap().as_str(),
            "https://example.com/chatbot/ask"
        );
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint_for("not a url"),
            Err(ClientError::InvalidUrl { .. })
        ));
        assert!(matches!(
            endpoint_for("ws://127.0.0.1:8765"),
            Err(ClientError::InvalidUrl { .. })
        ));
    }
}
