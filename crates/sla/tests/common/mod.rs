//! Shared fixtures for the engine integration tests.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use helpdesk_core::deadline;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::ticket::{SlaTicket, TicketPriority, TicketStatus};
use helpdesk_core::time::Clock;
use helpdesk_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use helpdesk_db::repositories::TicketRepo;
use helpdesk_notify::{DbRecipientResolver, Dispatcher, InAppStore};
use helpdesk_sla::SlaScanner;

/// A clock pinned to an explicit instant, movable mid-test.
pub struct FixedClock(Mutex<Timestamp>);

impl FixedClock {
    pub fn at(instant: Timestamp) -> Arc<Self> {
        Arc::new(Self(Mutex::new(instant)))
    }

    pub fn set(&self, instant: Timestamp) {
        *self.0.lock().unwrap() = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.0.lock().unwrap()
    }
}

/// The fixed creation instant used across scenarios.
pub fn origin() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// A scanner wired to the in-app channel only (no SMTP / webhook in tests).
pub fn scanner_with_clock(pool: &PgPool, clock: Arc<FixedClock>) -> SlaScanner {
    SlaScanner::new(
        pool.clone(),
        SlaPolicySet::default(),
        clock,
        Arc::new(DbRecipientResolver::new(pool.clone())),
        Dispatcher::new(None, None, InAppStore::new(pool.clone())),
    )
}

pub async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id")
        .bind(email)
        .bind("Agent")
        .fetch_one(pool)
        .await
        .expect("seed user")
}

/// Insert an open ticket with deadlines computed from the default policy.
pub async fn seed_ticket(
    pool: &PgPool,
    priority: TicketPriority,
    assignee_id: Option<DbId>,
) -> SlaTicket {
    let mut ticket = SlaTicket {
        id: 0,
        org_id: 1,
        subject: "scanner test".into(),
        priority,
        status: TicketStatus::Open,
        assignee_id,
        created_at: origin(),
        response_due_at: None,
        resolution_due_at: None,
        first_response_at: None,
        resolved_at: None,
        closed_at: None,
        response_warning_sent_at: None,
        response_breach_sent_at: None,
        resolution_warning_sent_at: None,
        resolution_breach_sent_at: None,
    };
    deadline::apply_on_create(&mut ticket, &SlaPolicySet::default()).unwrap();
    ticket.id = TicketRepo::insert(pool, &ticket).await.expect("seed ticket");
    ticket
}
