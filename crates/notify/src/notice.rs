//! The typed event handed to the dispatcher.

use helpdesk_core::ticket::{SlaKind, SlaSeverity, SlaTicket, TicketPriority};
use helpdesk_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::category::NotificationCategory;

/// One deadline crossing on one ticket.
///
/// Carries everything a channel client needs; channel clients render it
/// however their medium requires. This is deliberately a closed struct, not
/// a JSON bag, so the dispatcher's contract stays checkable at compile time.
#[derive(Debug, Clone, Serialize)]
pub struct SlaNotice {
    pub ticket_id: DbId,
    pub org_id: DbId,
    pub subject: String,
    pub priority: TicketPriority,
    pub kind: SlaKind,
    pub severity: SlaSeverity,
    pub due_at: Timestamp,
}

impl SlaNotice {
    pub fn new(ticket: &SlaTicket, kind: SlaKind, severity: SlaSeverity, due_at: Timestamp) -> Self {
        Self {
            ticket_id: ticket.id,
            org_id: ticket.org_id,
            subject: ticket.subject.clone(),
            priority: ticket.priority,
            kind,
            severity,
            due_at,
        }
    }

    /// The category this notice routes under: warnings are SLA alerts,
    /// breaches are operational security alerts (and thus unsilenceable).
    pub fn category(&self) -> NotificationCategory {
        match self.severity {
            SlaSeverity::Warning => NotificationCategory::SlaAlerts,
            SlaSeverity::Breach => NotificationCategory::Security,
        }
    }

    /// One-line headline, used as the email subject and in-app title.
    pub fn title(&self) -> String {
        match self.severity {
            SlaSeverity::Warning => format!(
                "SLA warning: ticket #{} {} due {}",
                self.ticket_id, self.kind, self.due_at
            ),
            SlaSeverity::Breach => format!(
                "SLA breach: ticket #{} {} overdue since {}",
                self.ticket_id, self.kind, self.due_at
            ),
        }
    }

    /// Short plain-text body.
    pub fn body(&self) -> String {
        format!(
            "Ticket #{} ({}, priority {}): the {} SLA {} its deadline of {}.",
            self.ticket_id,
            self.subject,
            self.priority,
            self.kind,
            match self.severity {
                SlaSeverity::Warning => "is approaching",
                SlaSeverity::Breach => "has passed",
            },
            self.due_at,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
