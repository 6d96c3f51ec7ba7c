//! Ticket row model and its conversion into the domain projection.

use helpdesk_core::error::CoreError;
use helpdesk_core::ticket::SlaTicket;
use helpdesk_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// The SLA projection of a `tickets` row, with the enum columns still as
/// TEXT. Parse into the domain type with [`TicketSlaRow::into_domain`].
#[derive(Debug, Clone, FromRow)]
pub struct TicketSlaRow {
    pub id: DbId,
    pub org_id: DbId,
    pub subject: String,
    pub priority: String,
    pub status: String,
    pub assignee_id: Option<DbId>,
    pub created_at: Timestamp,
    pub response_due_at: Option<Timestamp>,
    pub resolution_due_at: Option<Timestamp>,
    pub first_response_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,
    pub response_warning_sent_at: Option<Timestamp>,
    pub response_breach_sent_at: Option<Timestamp>,
    pub resolution_warning_sent_at: Option<Timestamp>,
    pub resolution_breach_sent_at: Option<Timestamp>,
}

impl TicketSlaRow {
    /// Parse the TEXT-typed columns into the closed domain enums.
    ///
    /// An unrecognised priority or status is a validation error, surfaced to
    /// the caller instead of silently defaulting — the affected ticket is
    /// skipped for the pass and shows up in the error count.
    pub fn into_domain(self) -> Result<SlaTicket, CoreError> {
        Ok(SlaTicket {
            id: self.id,
            org_id: self.org_id,
            subject: self.subject,
            priority: self.priority.parse()?,
            status: self.status.parse()?,
            assignee_id: self.assignee_id,
            created_at: self.created_at,
            response_due_at: self.response_due_at,
            resolution_due_at: self.resolution_due_at,
            first_response_at: self.first_response_at,
            resolved_at: self.resolved_at,
            closed_at: self.closed_at,
            response_warning_sent_at: self.response_warning_sent_at,
            response_breach_sent_at: self.response_breach_sent_at,
            resolution_warning_sent_at: self.resolution_warning_sent_at,
            resolution_breach_sent_at: self.resolution_breach_sent_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
