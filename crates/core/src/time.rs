//! Injectable wall-clock source.
//!
//! The scanner and scheduler take a [`Clock`] instead of calling
//! `Utc::now()` directly so tests can pin time to an exact instant.

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}
