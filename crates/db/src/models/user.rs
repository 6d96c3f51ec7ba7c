//! Minimal user projection used for notification fan-out.

use helpdesk_core::types::DbId;
use sqlx::FromRow;

/// A notification recipient: the id plus the address material the
/// dispatcher needs, loaded in one query.
#[derive(Debug, Clone, FromRow)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
    pub display_name: String,
}
