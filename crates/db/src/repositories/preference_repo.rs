//! Repository for the `notification_preferences` table.

use helpdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::NotificationPreferenceRow;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, user_id, category, is_enabled, channel_email, channel_chat, \
    channel_in_app, frequency, created_at, updated_at";

pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// The stored preference for a (user, category) pair, if the user has
    /// ever customised it.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
    ) -> Result<Option<NotificationPreferenceRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1 AND category = $2");
        sqlx::query_as::<_, NotificationPreferenceRow>(&query)
            .bind(user_id)
            .bind(category)
            .fetch_optional(pool)
            .await
    }

    /// All stored preferences for a user.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<NotificationPreferenceRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_preferences \
             WHERE user_id = $1 \
             ORDER BY category"
        );
        sqlx::query_as::<_, NotificationPreferenceRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or update a preference in a single round-trip.
    ///
    /// `COALESCE` keeps the existing (or default) value for any field the
    /// caller left unset.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
        is_enabled: Option<bool>,
        channel_email: Option<bool>,
        channel_chat: Option<bool>,
        channel_in_app: Option<bool>,
        frequency: Option<&str>,
    ) -> Result<NotificationPreferenceRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences \
                (user_id, category, is_enabled, channel_email, channel_chat, \
                 channel_in_app, frequency) \
             VALUES ($1, $2, COALESCE($3, true), COALESCE($4, true), COALESCE($5, false), \
                     COALESCE($6, true), COALESCE($7, 'immediate')) \
             ON CONFLICT (user_id, category) DO UPDATE SET \
                is_enabled = COALESCE($3, notification_preferences.is_enabled), \
                channel_email = COALESCE($4, notification_preferences.channel_email), \
                channel_chat = COALESCE($5, notification_preferences.channel_chat), \
                channel_in_app = COALESCE($6, notification_preferences.channel_in_app), \
                frequency = COALESCE($7, notification_preferences.frequency), \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreferenceRow>(&query)
            .bind(user_id)
            .bind(category)
            .bind(is_enabled)
            .bind(channel_email)
            .bind(channel_chat)
            .bind(channel_in_app)
            .bind(frequency)
            .fetch_one(pool)
            .await
    }
}
