//! Notification entity models and DTOs.

use helpdesk_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table (the in-app store).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub ticket_id: Option<DbId>,
    pub category: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `notification_preferences` table.
///
/// Rows exist only after an explicit user action; the effective settings
/// for users without a row come from category defaults at the read
/// boundary, never from fabricated rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreferenceRow {
    pub id: DbId,
    pub user_id: DbId,
    pub category: String,
    pub is_enabled: bool,
    pub channel_email: bool,
    pub channel_chat: bool,
    pub channel_in_app: bool,
    pub frequency: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating a notification preference.
#[derive(Debug, Deserialize)]
pub struct UpdatePreference {
    pub is_enabled: Option<bool>,
    pub channel_email: Option<bool>,
    pub channel_chat: Option<bool>,
    pub channel_in_app: Option<bool>,
    pub frequency: Option<String>,
}
