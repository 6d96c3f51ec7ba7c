//! The SLA policy table: ticket priority → response/resolution targets.
//!
//! Pure configuration data, immutable at runtime. The warning ratio (how far
//! into an interval the warning fires) defaults to 0.75 but is a config knob,
//! not an invariant.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ticket::TicketPriority;

/// Fraction of an SLA interval after which a warning is due.
pub const DEFAULT_WARNING_RATIO: f64 = 0.75;

/// Target durations for one priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTarget {
    pub response_target_minutes: i64,
    pub resolution_target_minutes: i64,
}

impl SlaTarget {
    pub fn response_target(&self) -> Duration {
        Duration::minutes(self.response_target_minutes)
    }

    pub fn resolution_target(&self) -> Duration {
        Duration::minutes(self.resolution_target_minutes)
    }
}

/// The full priority → target mapping plus the warning ratio.
#[derive(Debug, Clone)]
pub struct SlaPolicySet {
    targets: HashMap<TicketPriority, SlaTarget>,
    warning_ratio: f64,
}

impl SlaPolicySet {
    /// Build a policy set from an explicit mapping.
    ///
    /// The warning ratio must lie in `(0.0, 1.0)`; anything else is a
    /// configuration error.
    pub fn new(
        targets: HashMap<TicketPriority, SlaTarget>,
        warning_ratio: f64,
    ) -> Result<Self, CoreError> {
        if !(warning_ratio > 0.0 && warning_ratio < 1.0) {
            return Err(CoreError::Configuration(format!(
                "warning ratio must be in (0.0, 1.0), got {warning_ratio}"
            )));
        }
        Ok(Self {
            targets,
            warning_ratio,
        })
    }

    /// The default table with a non-default warning ratio.
    pub fn with_warning_ratio(warning_ratio: f64) -> Result<Self, CoreError> {
        Self::new(default_targets(), warning_ratio)
    }

    /// Look up the targets for a priority.
    ///
    /// A missing entry is a configuration error: the affected ticket is
    /// skipped for the current pass and retried once the table is fixed.
    pub fn target_for(&self, priority: TicketPriority) -> Result<SlaTarget, CoreError> {
        self.targets.get(&priority).copied().ok_or_else(|| {
            CoreError::Configuration(format!("no SLA target configured for priority {priority}"))
        })
    }

    pub fn warning_ratio(&self) -> f64 {
        self.warning_ratio
    }
}

impl Default for SlaPolicySet {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            warning_ratio: DEFAULT_WARNING_RATIO,
        }
    }
}

fn default_targets() -> HashMap<TicketPriority, SlaTarget> {
    HashMap::from([
        (
            TicketPriority::Urgent,
            SlaTarget {
                response_target_minutes: 60,
                resolution_target_minutes: 240,
            },
        ),
        (
            TicketPriority::High,
            SlaTarget {
                response_target_minutes: 240,
                resolution_target_minutes: 1440,
            },
        ),
        (
            TicketPriority::Medium,
            SlaTarget {
                response_target_minutes: 480,
                resolution_target_minutes: 2880,
            },
        ),
        (
            TicketPriority::Low,
            SlaTarget {
                response_target_minutes: 1440,
                resolution_target_minutes: 4320,
            },
        ),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
