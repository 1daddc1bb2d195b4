//! Email relay client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::ContactConfig;

/// What the relay is asked to forward
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub from_name: String,
    pub subject: String,
}

/// How long a relay call may take before it counts as unreachable
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a relay call did not go through. The display text is shown to visitors.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Email service is not configured. Please contact me directly via email.")]
    NotConfigured,

    #[error("Could not reach the email service. Please try again or email me directly.")]
    Unreachable(#[source] reqwest::Error),

    #[error(
        "Failed to send message (HTTP {}). Please try again or email me directly.",
        status.as_u16()
    )]
    Rejected { status: StatusCode },
}

/// Forwards contact submissions as email
#[async_trait]
pub trait Relay: Send + Sync {
    async fn send(&self, message: &RelayMessage) -> Result<(), RelayError>;
}

#[derive(Serialize)]
struct Web3FormsPayload<'a> {
    access_key: &'a str,
    #[serde(flatten)]
    message: &'a RelayMessage,
}

/// Relay backed by the Web3Forms submit endpoint
pub struct Web3FormsRelay {
    endpoint: String,
    access_key: Option<String>,
    client: reqwest::Client,
}

impl Web3FormsRelay {
    pub fn new(endpoint: impl Into<String>, access_key: Option<String>) -> Self {
        Self::with_timeout(endpoint, access_key, DEFAULT_TIMEOUT)
    }

    /// A relay whose calls fail with `Unreachable` after `timeout`
    pub fn with_timeout(
        endpoint: impl Into<String>,
        access_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            endpoint: endpoint.into(),
            access_key: access_key.filter(|k| !k.trim().is_empty()),
            client,
        }
    }

    pub fn from_config(config: &ContactConfig) -> Self {
        Self::with_timeout(
            config.endpoint.clone(),
            config.access_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.access_key.is_some()
    }
}

#[async_trait]
impl Relay for Web3FormsRelay {
    async fn send(&self, message: &RelayMessage) -> Result<(), RelayError> {
        let access_key = self.access_key.as_deref().ok_or(RelayError::NotConfigured)?;

        let payload = Web3FormsPayload {
            access_key,
            message,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(RelayError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Relay rejected submission: {} {}", status, body);
            return Err(RelayError::Rejected { status });
        }

        tracing::info!("Relayed contact message from {}", message.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> RelayMessage {
        RelayMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello there, nice work!".to_string(),
            from_name: "Portfolio Contact Form".to_string(),
            subject: "New Contact Form Submission from Ada".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_expected_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submit"))
            .and(body_json(serde_json::json!({
                "access_key": "key-1",
                "name": "Ada",
                "email": "ada@example.com",
                "message": "Hello there, nice work!",
                "from_name": "Portfolio Contact Form",
                "subject": "New Contact Form Submission from Ada",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let relay = Web3FormsRelay::new(format!("{}/submit", server.uri()), Some("key-1".into()));
        relay.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let relay = Web3FormsRelay::new(server.uri(), Some("key".into()));
        let err = relay.send(&message()).await.unwrap_err();
        assert!(matches!(err, RelayError::Rejected { status } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let relay = Web3FormsRelay::new(server.uri(), Some("  ".into()));
        assert!(!relay.is_configured());
        let err = relay.send(&message()).await.unwrap_err();
        assert!(matches!(err, RelayError::NotConfigured));
        assert!(err.to_string().contains("contact me directly"));
    }

    #[tokio::test]
    async fn test_unreachable() {
        let relay = Web3FormsRelay::new("http://127.0.0.1:9/submit", Some("key".into()));
        let err = relay.send(&message()).await.unwrap_err();
        assert!(matches!(err, RelayError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_slow_relay_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let relay =
            Web3FormsRelay::with_timeout(server.uri(), Some("key".into()), Duration::from_millis(100));
        let err = relay.send(&message()).await.unwrap_err();
        assert!(matches!(err, RelayError::Unreachable(ref e) if e.is_timeout()));
    }
}
