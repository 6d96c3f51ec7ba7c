//! In-app notification channel.
//!
//! [`InAppStore`] writes a row to the `notifications` table; the bell UI
//! reads it back through the API. This is also where digest-frequency
//! events are queued for the downstream batch assembler.

use helpdesk_core::types::DbId;
use helpdesk_db::repositories::NotificationRepo;
use helpdesk_db::DbPool;

use crate::notice::SlaNotice;

/// Records notifications for in-app consumption.
pub struct InAppStore {
    pool: DbPool,
}

impl InAppStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a notice for a user, returning the stored row id.
    pub async fn record(&self, user_id: DbId, notice: &SlaNotice) -> Result<DbId, sqlx::Error> {
        NotificationRepo::create(
            &self.pool,
            user_id,
            Some(notice.ticket_id),
            notice.category().as_str(),
            &notice.title(),
            &notice.body(),
        )
        .await
    }
}
