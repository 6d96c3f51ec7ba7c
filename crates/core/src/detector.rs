//! Pure threshold classification for a ticket's SLA clocks.
//!
//! [`classify`] is stateless: it reads the ticket's deadlines, the current
//! wall-clock time, and the dedup ledger, and says what (if anything) is due
//! right now. It can be re-run at any cadence — at-most-once semantics come
//! entirely from the ledger, never from scan frequency.

use serde::Serialize;

use crate::ticket::{SlaKind, SlaSeverity, SlaTicket};
use crate::types::Timestamp;

/// Classification of one SLA clock at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaState {
    /// Clock satisfied, stopped, or never armed.
    NotApplicable,
    /// Before the warning threshold.
    OnTrack,
    /// Past the warning threshold and no warning recorded yet.
    WarningDue,
    /// Past the deadline and no breach recorded yet.
    BreachDue,
    /// Past the warning threshold, warning already recorded.
    AlreadyWarned,
    /// Past the deadline, breach already recorded.
    AlreadyBreached,
}

impl SlaState {
    /// Only these two states trigger action in the scanner; the rest are
    /// informational.
    pub fn is_actionable(&self) -> bool {
        match self {
            SlaState::WarningDue | SlaState::BreachDue => true,
            SlaState::NotApplicable
            | SlaState::OnTrack
            | SlaState::AlreadyWarned
            | SlaState::AlreadyBreached => false,
        }
    }

    /// The severity a scanner should act on, if any.
    pub fn due_severity(&self) -> Option<SlaSeverity> {
        match self {
            SlaState::WarningDue => Some(SlaSeverity::Warning),
            SlaState::BreachDue => Some(SlaSeverity::Breach),
            SlaState::NotApplicable
            | SlaState::OnTrack
            | SlaState::AlreadyWarned
            | SlaState::AlreadyBreached => None,
        }
    }
}

/// Both clocks classified at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaAssessment {
    pub response: SlaState,
    pub resolution: SlaState,
}

impl SlaAssessment {
    pub fn state_for(&self, kind: SlaKind) -> SlaState {
        match kind {
            SlaKind::Response => self.response,
            SlaKind::Resolution => self.resolution,
        }
    }
}

/// Classify both SLA clocks of a ticket at `now`.
pub fn classify(ticket: &SlaTicket, now: Timestamp, warning_ratio: f64) -> SlaAssessment {
    SlaAssessment {
        response: classify_kind(ticket, SlaKind::Response, now, warning_ratio),
        resolution: classify_kind(ticket, SlaKind::Resolution, now, warning_ratio),
    }
}

fn classify_kind(
    ticket: &SlaTicket,
    kind: SlaKind,
    now: Timestamp,
    warning_ratio: f64,
) -> SlaState {
    // A terminal status stops both clocks; existing markers are retained for
    // audit but never re-evaluated.
    if ticket.status.is_terminal() || ticket.is_satisfied(kind) {
        return SlaState::NotApplicable;
    }

    let Some(due_at) = ticket.due_at(kind) else {
        return SlaState::NotApplicable;
    };

    if now >= due_at {
        return if ticket.marker(kind, SlaSeverity::Breach).is_none() {
            SlaState::BreachDue
        } else {
            SlaState::AlreadyBreached
        };
    }

    let total = (due_at - ticket.created_at).num_seconds();
    if total <= 0 {
        // Degenerate interval (deadline at or before creation); now < due_at
        // here, so nothing can be due yet.
        return SlaState::OnTrack;
    }

    let elapsed = (now - ticket.created_at).num_seconds();
    let ratio = elapsed as f64 / total as f64;
    if ratio >= warning_ratio {
        if ticket.marker(kind, SlaSeverity::Warning).is_none() {
            SlaState::WarningDue
        } else {
            SlaState::AlreadyWarned
        }
    } else {
        SlaState::OnTrack
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
