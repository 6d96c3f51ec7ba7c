//! The SLA-relevant ticket projection and its closed enums.
//!
//! Priority, status, SLA kind, and severity are modelled as closed enums
//! (stored as TEXT in the database, parsed at the repository boundary) so
//! the detector can match exhaustively — an unknown status is a parse error
//! at load time, never a silent "on track".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// TicketPriority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// All priorities, in ascending order of urgency.
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TicketPriority::Low),
            "medium" => Ok(TicketPriority::Medium),
            "high" => Ok(TicketPriority::High),
            "urgent" => Ok(TicketPriority::Urgent),
            other => Err(CoreError::Validation(format!(
                "unknown ticket priority: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Waiting,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Waiting => "waiting",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Whether both SLA clocks have stopped for good.
    ///
    /// Deliberately an exhaustive match: a status added later must make an
    /// explicit choice here instead of defaulting to "still running".
    pub fn is_terminal(&self) -> bool {
        match self {
            TicketStatus::Resolved | TicketStatus::Closed => true,
            TicketStatus::Open | TicketStatus::InProgress | TicketStatus::Waiting => false,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "waiting" => Ok(TicketStatus::Waiting),
            "resolved" => Ok(TicketStatus::Resolved),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(CoreError::Validation(format!(
                "unknown ticket status: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SlaKind / SlaSeverity
// ---------------------------------------------------------------------------

/// Which of the two per-ticket SLA clocks is being talked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaKind {
    Response,
    Resolution,
}

impl SlaKind {
    pub const ALL: [SlaKind; 2] = [SlaKind::Response, SlaKind::Resolution];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlaKind::Response => "response",
            SlaKind::Resolution => "resolution",
        }
    }
}

impl fmt::Display for SlaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far past the threshold a ticket is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaSeverity {
    Warning,
    Breach,
}

impl SlaSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlaSeverity::Warning => "warning",
            SlaSeverity::Breach => "breach",
        }
    }
}

impl fmt::Display for SlaSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SlaTicket
// ---------------------------------------------------------------------------

/// The SLA-relevant projection of a ticket.
///
/// Every optional relationship is an explicit nullable field populated by the
/// repository at query time — the scanner never has to distinguish "not
/// loaded" from "absent".
#[derive(Debug, Clone, Serialize)]
pub struct SlaTicket {
    pub id: DbId,
    pub org_id: DbId,
    pub subject: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assignee_id: Option<DbId>,
    pub created_at: Timestamp,

    /// Deadline for the first agent response. Set once at creation, reset
    /// only on priority change.
    pub response_due_at: Option<Timestamp>,
    /// Deadline for resolution. Same lifecycle as `response_due_at`.
    pub resolution_due_at: Option<Timestamp>,

    /// Set once when the first public agent reply lands; satisfies the
    /// response SLA.
    pub first_response_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub closed_at: Option<Timestamp>,

    // Dedup ledger: when each (kind × severity) notification was sent.
    // Write-once per crossing; cleared only by a priority change.
    pub response_warning_sent_at: Option<Timestamp>,
    pub response_breach_sent_at: Option<Timestamp>,
    pub resolution_warning_sent_at: Option<Timestamp>,
    pub resolution_breach_sent_at: Option<Timestamp>,
}

impl SlaTicket {
    /// Read the dedup marker for a (kind, severity) pair.
    pub fn marker(&self, kind: SlaKind, severity: SlaSeverity) -> Option<Timestamp> {
        match (kind, severity) {
            (SlaKind::Response, SlaSeverity::Warning) => self.response_warning_sent_at,
            (SlaKind::Response, SlaSeverity::Breach) => self.response_breach_sent_at,
            (SlaKind::Resolution, SlaSeverity::Warning) => self.resolution_warning_sent_at,
            (SlaKind::Resolution, SlaSeverity::Breach) => self.resolution_breach_sent_at,
        }
    }

    /// Clear all four dedup markers (used when a priority change resets the
    /// meaning of "already warned / already breached").
    pub fn clear_markers(&mut self) {
        self.response_warning_sent_at = None;
        self.response_breach_sent_at = None;
        self.resolution_warning_sent_at = None;
        self.resolution_breach_sent_at = None;
    }

    /// The deadline for a given SLA kind.
    pub fn due_at(&self, kind: SlaKind) -> Option<Timestamp> {
        match kind {
            SlaKind::Response => self.response_due_at,
            SlaKind::Resolution => self.resolution_due_at,
        }
    }

    /// Whether the satisfying event for a given SLA kind has occurred.
    pub fn is_satisfied(&self, kind: SlaKind) -> bool {
        match kind {
            SlaKind::Response => self.first_response_at.is_some(),
            SlaKind::Resolution => self.resolved_at.is_some() || self.closed_at.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_through_str() {
        for p in TicketPriority::ALL {
            assert_eq!(p.as_str().parse::<TicketPriority>().unwrap(), p);
        }
    }

    #[test]
    fn unknown_priority_is_a_validation_error() {
        let err = "critical".parse::<TicketPriority>().unwrap_err();
        assert!(err.to_string().contains("unknown ticket priority"));
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let err = "pending".parse::<TicketStatus>().unwrap_err();
        assert!(err.to_string().contains("unknown ticket status"));
    }

    #[test]
    fn terminal_statuses() {
        assert!(TicketStatus::Resolved.is_terminal());
        assert!(TicketStatus::Closed.is_terminal());
        assert!(!TicketStatus::Open.is_terminal());
        assert!(!TicketStatus::InProgress.is_terminal());
        assert!(!TicketStatus::Waiting.is_terminal());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Waiting,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(s.as_str().parse::<TicketStatus>().unwrap(), s);
        }
    }
}
