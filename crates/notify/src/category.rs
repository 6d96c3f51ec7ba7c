//! Notification categories.
//!
//! A category groups events that share default delivery settings. SLA
//! warnings route as [`SlaAlerts`](NotificationCategory::SlaAlerts); SLA
//! breaches route as [`Security`](NotificationCategory::Security) —
//! operational alerts that cannot be silenced.

use std::fmt;
use std::str::FromStr;

use helpdesk_core::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Security-relevant and operational alerts. Always delivered.
    Security,
    /// SLA warnings approaching a deadline.
    SlaAlerts,
    /// Routine ticket activity (assignments, comments).
    TicketActivity,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 3] = [
        NotificationCategory::Security,
        NotificationCategory::SlaAlerts,
        NotificationCategory::TicketActivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Security => "security",
            NotificationCategory::SlaAlerts => "sla_alerts",
            NotificationCategory::TicketActivity => "ticket_activity",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(NotificationCategory::Security),
            "sla_alerts" => Ok(NotificationCategory::SlaAlerts),
            "ticket_activity" => Ok(NotificationCategory::TicketActivity),
            other => Err(CoreError::Validation(format!(
                "unknown notification category: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
