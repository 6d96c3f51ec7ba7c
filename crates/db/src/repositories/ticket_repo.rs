//! Repository for the `tickets` table — SLA projection only.
//!
//! Ticket CRUD proper belongs to the ticketing service; this repository
//! carries exactly what the SLA engine needs: the eligibility query, the
//! conditional dedup-marker update (the at-most-once primitive), and the
//! writeback for deadline-lifecycle mutations.

use helpdesk_core::ticket::{SlaKind, SlaSeverity, SlaTicket};
use helpdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::ticket::TicketSlaRow;
use crate::models::user::Recipient;

/// Column list for SLA projection queries.
const SLA_COLUMNS: &str = "id, org_id, subject, priority, status, assignee_id, created_at, \
    response_due_at, resolution_due_at, first_response_at, resolved_at, closed_at, \
    response_warning_sent_at, response_breach_sent_at, resolution_warning_sent_at, \
    resolution_breach_sent_at";

pub struct TicketRepo;

impl TicketRepo {
    /// All tickets with at least one unresolved SLA clock.
    ///
    /// Matches the scanner contract: status not terminal AND (response clock
    /// armed and unsatisfied, OR resolution clock armed).
    pub async fn find_sla_eligible(pool: &PgPool) -> Result<Vec<TicketSlaRow>, sqlx::Error> {
        let query = format!(
            "SELECT {SLA_COLUMNS} FROM tickets \
             WHERE status NOT IN ('resolved', 'closed') \
               AND ((response_due_at IS NOT NULL AND first_response_at IS NULL) \
                    OR resolution_due_at IS NOT NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TicketSlaRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Load one ticket's SLA projection.
    pub async fn get_sla(pool: &PgPool, id: DbId) -> Result<Option<TicketSlaRow>, sqlx::Error> {
        let query = format!("SELECT {SLA_COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, TicketSlaRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a ticket's SLA projection, returning the generated id.
    ///
    /// Used at the creation boundary (after the deadline lifecycle has set
    /// the due dates) and by tests.
    pub async fn insert(pool: &PgPool, ticket: &SlaTicket) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO tickets \
                (org_id, subject, priority, status, assignee_id, created_at, \
                 response_due_at, resolution_due_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(ticket.org_id)
        .bind(&ticket.subject)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.assignee_id)
        .bind(ticket.created_at)
        .bind(ticket.response_due_at)
        .bind(ticket.resolution_due_at)
        .fetch_one(pool)
        .await
    }

    /// Conditionally stamp one dedup marker.
    ///
    /// Executes a single atomic `UPDATE ... WHERE <marker> IS NULL` so two
    /// overlapping passes cannot both claim the same crossing. Returns
    /// `true` if this call set the marker, `false` if it was already set.
    pub async fn mark_notification_sent(
        pool: &PgPool,
        ticket_id: DbId,
        kind: SlaKind,
        severity: SlaSeverity,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let column = marker_column(kind, severity);
        let query = format!("UPDATE tickets SET {column} = $1 WHERE id = $2 AND {column} IS NULL");
        let result = sqlx::query(&query)
            .bind(now)
            .bind(ticket_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist the outcome of a deadline-lifecycle mutation (priority
    /// change, first response, resolve, close) in one statement.
    pub async fn update_sla_fields(pool: &PgPool, ticket: &SlaTicket) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tickets SET \
                priority = $1, \
                status = $2, \
                response_due_at = $3, \
                resolution_due_at = $4, \
                first_response_at = $5, \
                resolved_at = $6, \
                closed_at = $7, \
                response_warning_sent_at = $8, \
                response_breach_sent_at = $9, \
                resolution_warning_sent_at = $10, \
                resolution_breach_sent_at = $11 \
             WHERE id = $12",
        )
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.response_due_at)
        .bind(ticket.resolution_due_at)
        .bind(ticket.first_response_at)
        .bind(ticket.resolved_at)
        .bind(ticket.closed_at)
        .bind(ticket.response_warning_sent_at)
        .bind(ticket.response_breach_sent_at)
        .bind(ticket.resolution_warning_sent_at)
        .bind(ticket.resolution_breach_sent_at)
        .bind(ticket.id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The users to notify for a ticket: the assignee plus all watchers,
    /// active users only, deduplicated.
    pub async fn recipients_for(
        pool: &PgPool,
        ticket_id: DbId,
        assignee_id: Option<DbId>,
    ) -> Result<Vec<Recipient>, sqlx::Error> {
        sqlx::query_as::<_, Recipient>(
            "SELECT DISTINCT u.id AS user_id, u.email, u.display_name \
             FROM users u \
             WHERE u.is_active = true \
               AND (u.id = $2 \
                    OR u.id IN (SELECT user_id FROM ticket_watchers WHERE ticket_id = $1)) \
             ORDER BY user_id",
        )
        .bind(ticket_id)
        .bind(assignee_id)
        .fetch_all(pool)
        .await
    }
}

fn marker_column(kind: SlaKind, severity: SlaSeverity) -> &'static str {
    match (kind, severity) {
        (SlaKind::Response, SlaSeverity::Warning) => "response_warning_sent_at",
        (SlaKind::Response, SlaSeverity::Breach) => "response_breach_sent_at",
        (SlaKind::Resolution, SlaSeverity::Warning) => "resolution_warning_sent_at",
        (SlaKind::Resolution, SlaSeverity::Breach) => "resolution_breach_sent_at",
    }
}
