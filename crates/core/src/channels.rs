//! Well-known delivery channel name constants.
//!
//! These must match the channel values recorded on delivery attempts and
//! referenced by the preference resolver, the dispatcher, and API handlers.

/// Email notification delivered via SMTP.
pub const CHANNEL_EMAIL: &str = "email";

/// Chat notification delivered to an external webhook endpoint.
pub const CHANNEL_CHAT: &str = "chat";

/// In-app notification stored for the notification bell UI.
pub const CHANNEL_IN_APP: &str = "in_app";
