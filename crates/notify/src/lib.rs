//! Notification side of the helpdesk SLA engine.
//!
//! This crate decides *to whom* and *through which channel* an SLA event is
//! delivered, and performs the delivery:
//!
//! - [`category`] — notification categories and their documented defaults.
//! - [`preferences`] — effective per-user settings with the security
//!   category enforced at the read boundary.
//! - [`notice`] — the typed event handed to the dispatcher.
//! - [`recipient`] — who gets notified for a ticket.
//! - [`delivery`] — channel clients (email, chat webhook, in-app store).
//! - [`dispatcher`] — fan-out with per-channel failure isolation.

pub mod category;
pub mod delivery;
pub mod dispatcher;
pub mod notice;
pub mod preferences;
pub mod recipient;

pub use category::NotificationCategory;
pub use delivery::chat::{ChatWebhookConfig, ChatWebhookSender};
pub use delivery::email::{EmailConfig, EmailSender};
pub use delivery::in_app::InAppStore;
pub use dispatcher::{DeliveryAttempt, DeliveryFailure, DeliveryOutcome, Dispatcher};
pub use notice::SlaNotice;
pub use preferences::{EffectivePreference, Frequency, PreferenceResolver};
pub use recipient::{DbRecipientResolver, RecipientResolver};
