//! Integration tests for the scheduler runtime: lifecycle, status
//! reporting, and overlap prevention on the manual trigger.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::ticket::{SlaTicket, TicketPriority};
use sqlx::PgPool;

use common::{origin, scanner_with_clock, seed_ticket, seed_user, FixedClock};
use helpdesk_db::models::user::Recipient;
use helpdesk_notify::{Dispatcher, InAppStore, RecipientResolver};
use helpdesk_sla::{SchedulerError, SlaScanner, SlaScheduler, SLA_SCAN_JOB_NAME};

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn start_is_idempotent_and_stop_clears_state(pool: PgPool) {
    let clock = FixedClock::at(origin());
    let scanner = Arc::new(scanner_with_clock(&pool, clock.clone()));
    let scheduler = SlaScheduler::new(scanner, Duration::from_secs(3600), clock);

    assert!(!scheduler.is_running());

    scheduler.start().await;
    scheduler.start().await; // no-op
    assert!(scheduler.is_running());

    // Give the immediate first tick a moment to run and publish status.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let status = scheduler.status();
    assert!(status.running);
    assert_eq!(status.job_name, SLA_SCAN_JOB_NAME);
    assert!(status.next_run_at.is_some());
    assert!(status.last_summary.is_some());

    scheduler.stop().await;
    assert!(!scheduler.is_running());
    assert!(scheduler.status().next_run_at.is_none());

    // Stopping again is a no-op.
    scheduler.stop().await;
}

// ---------------------------------------------------------------------------
// Manual trigger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn run_now_returns_the_batch_summary(pool: PgPool) {
    let agent = seed_user(&pool, "agent@example.com").await;
    seed_ticket(&pool, TicketPriority::Urgent, Some(agent)).await;

    let clock = FixedClock::at(origin() + ChronoDuration::minutes(45));
    let scanner = Arc::new(scanner_with_clock(&pool, clock.clone()));
    let scheduler = SlaScheduler::new(scanner, Duration::from_secs(3600), clock);

    // Works without the timer ever being started.
    let summary = scheduler.run_now().await.unwrap();
    assert_eq!(summary.tickets_examined, 1);
    assert_eq!(summary.warnings_sent, 1);

    // The summary is published to the status surface.
    assert_eq!(scheduler.status().last_summary, Some(summary));
}

// ---------------------------------------------------------------------------
// Overlap prevention
// ---------------------------------------------------------------------------

/// Resolver that stalls long enough for a second trigger to collide.
struct SlowResolver;

#[async_trait]
impl RecipientResolver for SlowResolver {
    async fn recipients(&self, _ticket: &SlaTicket) -> Result<Vec<Recipient>, sqlx::Error> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(vec![])
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_manual_triggers_are_rejected(pool: PgPool) {
    seed_ticket(&pool, TicketPriority::Urgent, None).await;

    let clock = FixedClock::at(origin() + ChronoDuration::minutes(45));
    let scanner = Arc::new(SlaScanner::new(
        pool.clone(),
        SlaPolicySet::default(),
        clock.clone(),
        Arc::new(SlowResolver),
        Dispatcher::new(None, None, InAppStore::new(pool.clone())),
    ));
    let scheduler = Arc::new(SlaScheduler::new(
        scanner,
        Duration::from_secs(3600),
        clock,
    ));

    let first = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_now().await })
    };

    // Let the first scan take the gate, then collide with it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = scheduler.run_now().await;
    assert!(matches!(second, Err(SchedulerError::ScanInProgress)));

    // The first pass completes normally.
    let summary = first.await.unwrap().unwrap();
    assert_eq!(summary.tickets_examined, 1);
}
