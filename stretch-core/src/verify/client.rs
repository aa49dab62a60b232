//! Verifier trait and the HTTP client for the fact-check endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::debug;

use crate::error::{AttemptError, Error, Result};
use crate::types::{Verdict, VerificationRequest};

/// Default fact-check endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-cloud-function.elice.io/8d0fbc41-2edd-4525-8af7-25a6f429ad11/check";

/// A single attempt against a verification backend.
///
/// Implementations make exactly one call; retries and pacing belong to
/// [`RetryScheduler`](crate::retry::RetryScheduler).
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Check `request.claim` against `request.document`.
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> std::result::Result<Verdict, AttemptError>;
}

/// Configuration for the HTTP verifier.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Bearer token
    pub api_key: String,
    /// Endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl VerifierConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 15,
        }
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    let timeout = Duration::from_secs(timeout_secs);

    // Some sandboxed macOS environments can panic during proxy auto-detection
    // in reqwest's default client builder. Fall back to no-proxy in that case.
    match catch_unwind(AssertUnwindSafe(|| Client::builder().timeout(timeout).build())) {
        Ok(Ok(client)) => Ok(client),
        Ok(Err(_)) | Err(_) => Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e))),
    }
}

/// Client for the fact-check endpoint.
pub struct HttpVerifier {
    config: VerifierConfig,
    http: Client,
}

impl HttpVerifier {
    pub fn new(config: VerifierConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("verification API key is empty"));
        }
        let http = build_http_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct CheckReply {
    #[serde(default)]
    supported: Option<bool>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Map a status code and body onto an attempt outcome.
///
/// Missing `supported` / `confidence` fields default to `false` / `0.0`.
pub fn interpret_response(
    status: StatusCode,
    body: &str,
) -> std::result::Result<Verdict, AttemptError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AttemptError::RateLimited);
    }
    if !status.is_success() {
        return Err(AttemptError::transport(format!(
            "verification API error ({}): {}",
            status, body
        )));
    }

    let reply: CheckReply = serde_json::from_str(body).map_err(|e| {
        AttemptError::transport(format!("failed to parse response: {}", e))
    })?;

    Ok(Verdict::new(
        reply.supported.unwrap_or(false),
        reply.confidence.unwrap_or(0.0),
    ))
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> std::result::Result<Verdict, AttemptError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        debug!(status = status.as_u16(), "verification response status");

        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::transport(format!("failed to read response: {}", e)))?;

        interpret_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_config_builder() {
        let config = VerifierConfig::new("test-key")
            .with_endpoint("https://verify.example.com/check")
            .with_timeout(10);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.endpoint, "https://verify.example.com/check");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_default_config() {
        let config = VerifierConfig::new("k");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = HttpVerifier::new(VerifierConfig::new("  ")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_interpret_success() {
        let verdict =
            interpret_response(StatusCode::OK, r#"{"supported": true, "confidence": 0.87}"#)
                .unwrap();
        assert!(verdict.supported);
        assert!((verdict.confidence - 0.87).abs() < 1e-9);
    }

    #[test]
    fn test_interpret_missing_fields_default() {
        let verdict = interpret_response(StatusCode::OK, r#"{"label": "whatever"}"#).unwrap();
        assert!(!verdict.supported);
        assert_eq!(verdict.confidence, 0.0);

        let verdict = interpret_response(StatusCode::OK, r#"{"supported": null}"#).unwrap();
        assert!(!verdict.supported);
    }

    #[test]
    fn test_interpret_rate_limited() {
        let err = interpret_response(StatusCode::TOO_MANY_REQUESTS, "slow down").unwrap_err();
        assert_eq!(err, AttemptError::RateLimited);
    }

    #[test]
    fn test_interpret_server_error() {
        let err = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        match err {
            AttemptError::Transport(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_interpret_malformed_body() {
        let err = interpret_response(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, AttemptError::Transport(ref m) if m.contains("parse")));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let verifier = HttpVerifier::new(
            VerifierConfig::new("k")
                .with_endpoint("http://127.0.0.1:9/check")
                .with_timeout(2),
        )
        .unwrap();
        let err = verifier
            .verify(&VerificationRequest::new("doc", "claim"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::Transport(_)));
    }
}
