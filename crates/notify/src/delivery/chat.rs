//! Chat delivery to an external webhook endpoint.
//!
//! [`ChatWebhookSender`] posts a JSON-encoded [`SlaNotice`](crate::SlaNotice)
//! to a configured URL. A transient failure (network error or 5xx) is
//! retried exactly once; client errors are surfaced immediately — an invalid
//! payload will not improve on retry.

use std::time::Duration;

use crate::notice::SlaNotice;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause before the single transient retry.
const RETRY_DELAY: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for chat webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Chat webhook returned HTTP {0}")]
    HttpStatus(u16),
}

impl ChatError {
    /// Server-side and network failures are worth retrying; a 4xx means the
    /// request itself is wrong.
    pub fn is_transient(&self) -> bool {
        match self {
            ChatError::Request(_) => true,
            ChatError::HttpStatus(status) => *status >= 500,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatWebhookConfig
// ---------------------------------------------------------------------------

/// Configuration for the chat webhook channel.
#[derive(Debug, Clone)]
pub struct ChatWebhookConfig {
    /// Webhook endpoint URL.
    pub url: String,
}

impl ChatWebhookConfig {
    /// Load configuration from the `CHAT_WEBHOOK_URL` environment variable.
    ///
    /// Returns `None` when unset, signalling the channel is not configured.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("CHAT_WEBHOOK_URL").ok()?;
        Some(Self { url })
    }
}

// ---------------------------------------------------------------------------
// ChatWebhookSender
// ---------------------------------------------------------------------------

/// Delivers SLA notices to an external chat webhook.
pub struct ChatWebhookSender {
    config: ChatWebhookConfig,
    client: reqwest::Client,
}

impl ChatWebhookSender {
    /// Create a new sender with a pre-configured HTTP client.
    pub fn new(config: ChatWebhookConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Deliver a notice, retrying once on a transient failure.
    pub async fn deliver(&self, notice: &SlaNotice) -> Result<(), ChatError> {
        let payload = serde_json::json!({
            "text": notice.title(),
            "ticket_id": notice.ticket_id,
            "kind": notice.kind,
            "severity": notice.severity,
            "priority": notice.priority,
            "due_at": notice.due_at,
        });

        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_transient() => {
                tracing::warn!(
                    url = %self.config.url,
                    error = %e,
                    "Chat webhook delivery failed, retrying once"
                );
                tokio::time::sleep(RETRY_DELAY).await;
                self.try_send(&payload).await
            }
            Err(e) => Err(e),
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, payload: &serde_json::Value) -> Result<(), ChatError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ChatError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
