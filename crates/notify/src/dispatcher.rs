//! Fan-out delivery with per-channel failure isolation.
//!
//! [`Dispatcher::dispatch`] attempts every channel the recipient's effective
//! preference allows, independently: a chat webhook timeout never blocks the
//! email or in-app delivery of the same event. Every attempt — including
//! skips — is reported back to the caller as a [`DeliveryAttempt`]; nothing
//! here retries (channel clients own their retry policy) and nothing here
//! propagates an error.

use std::fmt;
use std::time::Duration;

use helpdesk_core::channels::{CHANNEL_CHAT, CHANNEL_EMAIL, CHANNEL_IN_APP};
use helpdesk_db::models::user::Recipient;

use crate::delivery::chat::ChatWebhookSender;
use crate::delivery::email::EmailSender;
use crate::delivery::in_app::InAppStore;
use crate::notice::SlaNotice;
use crate::preferences::EffectivePreference;

/// Upper bound on any single channel call, over and above the channel
/// client's own request timeout.
const CHANNEL_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The channel call exceeded its time budget.
    Timeout,
    /// Network / server-side failure; the next scan will retry the send.
    Transport(String),
    /// The channel rejected the request as malformed (bad address, 4xx);
    /// an operator has to fix the underlying data.
    Rejected(String),
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryFailure::Timeout => f.write_str("channel call timed out"),
            DeliveryFailure::Transport(msg) => write!(f, "transport failure: {msg}"),
            DeliveryFailure::Rejected(msg) => write!(f, "rejected by channel: {msg}"),
        }
    }
}

/// Result of one channel attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Channel disabled by preference or not configured for this deployment.
    Skipped,
    Failed(DeliveryFailure),
}

/// One (channel, recipient) attempt with its outcome. Ephemeral — surfaced
/// through logs and the scan summary, never persisted.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub channel: &'static str,
    pub recipient: helpdesk_core::types::DbId,
    pub outcome: DeliveryOutcome,
}

impl DeliveryAttempt {
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Delivered)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Failed(_))
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Delivers one notice to one recipient across all configured channels.
pub struct Dispatcher {
    email: Option<EmailSender>,
    chat: Option<ChatWebhookSender>,
    in_app: InAppStore,
}

impl Dispatcher {
    /// `email`/`chat` are `None` when the deployment has not configured the
    /// channel; the in-app store is always available.
    pub fn new(
        email: Option<EmailSender>,
        chat: Option<ChatWebhookSender>,
        in_app: InAppStore,
    ) -> Self {
        Self {
            email,
            chat,
            in_app,
        }
    }

    /// Attempt delivery on every channel, one outcome per channel.
    pub async fn dispatch(
        &self,
        recipient: &Recipient,
        pref: &EffectivePreference,
        notice: &SlaNotice,
    ) -> Vec<DeliveryAttempt> {
        // Digest frequencies queue the event in the in-app store for the
        // downstream batch assembler; the inline sends are skipped.
        let inline = !pref.frequency.is_digest();

        let email_outcome = if inline && pref.should_send(CHANNEL_EMAIL) {
            self.deliver_email(recipient, notice).await
        } else {
            DeliveryOutcome::Skipped
        };

        let chat_outcome = if inline && pref.should_send(CHANNEL_CHAT) {
            self.deliver_chat(notice).await
        } else {
            DeliveryOutcome::Skipped
        };

        let in_app_outcome = if pref.should_send(CHANNEL_IN_APP) {
            self.deliver_in_app(recipient, notice).await
        } else {
            DeliveryOutcome::Skipped
        };

        let attempts = vec![
            DeliveryAttempt {
                channel: CHANNEL_EMAIL,
                recipient: recipient.user_id,
                outcome: email_outcome,
            },
            DeliveryAttempt {
                channel: CHANNEL_CHAT,
                recipient: recipient.user_id,
                outcome: chat_outcome,
            },
            DeliveryAttempt {
                channel: CHANNEL_IN_APP,
                recipient: recipient.user_id,
                outcome: in_app_outcome,
            },
        ];

        for attempt in &attempts {
            match &attempt.outcome {
                DeliveryOutcome::Delivered => tracing::debug!(
                    channel = attempt.channel,
                    user_id = attempt.recipient,
                    ticket_id = notice.ticket_id,
                    "Notification delivered"
                ),
                DeliveryOutcome::Skipped => {}
                DeliveryOutcome::Failed(failure) => tracing::warn!(
                    channel = attempt.channel,
                    user_id = attempt.recipient,
                    ticket_id = notice.ticket_id,
                    error = %failure,
                    "Notification delivery failed"
                ),
            }
        }

        attempts
    }

    async fn deliver_email(&self, recipient: &Recipient, notice: &SlaNotice) -> DeliveryOutcome {
        let Some(sender) = &self.email else {
            return DeliveryOutcome::Skipped;
        };
        match tokio::time::timeout(
            CHANNEL_TIMEOUT,
            sender.deliver(&recipient.email, &notice.title(), &notice.body()),
        )
        .await
        {
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) if e.is_transient() => {
                DeliveryOutcome::Failed(DeliveryFailure::Transport(e.to_string()))
            }
            Ok(Err(e)) => DeliveryOutcome::Failed(DeliveryFailure::Rejected(e.to_string())),
            Err(_) => DeliveryOutcome::Failed(DeliveryFailure::Timeout),
        }
    }

    async fn deliver_chat(&self, notice: &SlaNotice) -> DeliveryOutcome {
        let Some(sender) = &self.chat else {
            return DeliveryOutcome::Skipped;
        };
        match tokio::time::timeout(CHANNEL_TIMEOUT, sender.deliver(notice)).await {
            Ok(Ok(())) => DeliveryOutcome::Delivered,
            Ok(Err(e)) if e.is_transient() => {
                DeliveryOutcome::Failed(DeliveryFailure::Transport(e.to_string()))
            }
            Ok(Err(e)) => DeliveryOutcome::Failed(DeliveryFailure::Rejected(e.to_string())),
            Err(_) => DeliveryOutcome::Failed(DeliveryFailure::Timeout),
        }
    }

    async fn deliver_in_app(&self, recipient: &Recipient, notice: &SlaNotice) -> DeliveryOutcome {
        match tokio::time::timeout(
            CHANNEL_TIMEOUT,
            self.in_app.record(recipient.user_id, notice),
        )
        .await
        {
            Ok(Ok(_id)) => DeliveryOutcome::Delivered,
            Ok(Err(e)) => DeliveryOutcome::Failed(DeliveryFailure::Transport(e.to_string())),
            Err(_) => DeliveryOutcome::Failed(DeliveryFailure::Timeout),
        }
    }
}
