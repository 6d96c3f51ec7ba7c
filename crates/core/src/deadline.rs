//! Deadline lifecycle for a ticket's two SLA clocks.
//!
//! These functions only mutate [`SlaTicket`] fields; persistence is the
//! caller's job. Deadlines are set once at creation from the policy table
//! and recomputed only on an explicit priority change, which also resets
//! the dedup ledger — "already warned" means nothing once the deadlines
//! have moved.

use crate::error::CoreError;
use crate::policy::SlaPolicySet;
use crate::ticket::{SlaTicket, TicketPriority, TicketStatus};
use crate::types::Timestamp;

/// Set both deadlines on a freshly created ticket.
pub fn apply_on_create(ticket: &mut SlaTicket, policies: &SlaPolicySet) -> Result<(), CoreError> {
    let target = policies.target_for(ticket.priority)?;
    ticket.response_due_at = Some(ticket.created_at + target.response_target());
    ticket.resolution_due_at = Some(ticket.created_at + target.resolution_target());
    Ok(())
}

/// Change priority: recompute both deadlines from the original `created_at`
/// and clear all four dedup markers.
pub fn apply_priority_change(
    ticket: &mut SlaTicket,
    new_priority: TicketPriority,
    policies: &SlaPolicySet,
) -> Result<(), CoreError> {
    let target = policies.target_for(new_priority)?;
    ticket.priority = new_priority;
    ticket.response_due_at = Some(ticket.created_at + target.response_target());
    ticket.resolution_due_at = Some(ticket.created_at + target.resolution_target());
    ticket.clear_markers();
    Ok(())
}

/// Record the first public agent reply. Idempotent: a second call is a no-op.
pub fn record_first_response(ticket: &mut SlaTicket, now: Timestamp) {
    if ticket.first_response_at.is_none() {
        ticket.first_response_at = Some(now);
    }
}

/// Move the ticket to `resolved`, stamping `resolved_at` if unset.
pub fn record_resolved(ticket: &mut SlaTicket, now: Timestamp) {
    ticket.status = TicketStatus::Resolved;
    if ticket.resolved_at.is_none() {
        ticket.resolved_at = Some(now);
    }
}

/// Move the ticket to `closed`, stamping `closed_at` if unset.
pub fn record_closed(ticket: &mut SlaTicket, now: Timestamp) {
    ticket.status = TicketStatus::Closed;
    if ticket.closed_at.is_none() {
        ticket.closed_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
