//! Recipient resolution.
//!
//! Who gets notified for a ticket is owned by the ticketing domain; the
//! engine consumes it through [`RecipientResolver`] so tests can substitute
//! a fixed set.

use async_trait::async_trait;
use helpdesk_core::ticket::SlaTicket;
use helpdesk_db::models::user::Recipient;
use helpdesk_db::repositories::TicketRepo;
use helpdesk_db::DbPool;

#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn recipients(&self, ticket: &SlaTicket) -> Result<Vec<Recipient>, sqlx::Error>;
}

/// Production resolver: the ticket's assignee plus its watchers.
pub struct DbRecipientResolver {
    pool: DbPool,
}

impl DbRecipientResolver {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientResolver for DbRecipientResolver {
    async fn recipients(&self, ticket: &SlaTicket) -> Result<Vec<Recipient>, sqlx::Error> {
        TicketRepo::recipients_for(&self.pool, ticket.id, ticket.assignee_id).await
    }
}
