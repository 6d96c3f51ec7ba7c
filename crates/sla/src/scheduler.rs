//! The scheduler runtime that drives the scanner.
//!
//! An explicit service object, constructed once at process start and shared
//! via `Arc` — no module-global state. One tokio task owns the recurring
//! timer; a non-blocking mutex guard guarantees at most one scan instance is
//! ever active, and ticks that fire while a scan is still running are
//! coalesced into the next one rather than queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use helpdesk_core::time::Clock;
use helpdesk_core::types::Timestamp;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::scanner::{ScanSummary, SlaScanner};

/// Registered job name, surfaced through the status endpoint.
pub const SLA_SCAN_JOB_NAME: &str = "sla-deadline-scan";

// ---------------------------------------------------------------------------
// Status / error types
// ---------------------------------------------------------------------------

/// Snapshot of the scheduler for health reporting.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub job_name: &'static str,
    pub next_run_at: Option<Timestamp>,
    pub last_summary: Option<ScanSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A scan is already in flight; manual triggers are subject to the same
    /// overlap prevention as timer ticks.
    #[error("an SLA scan is already in progress")]
    ScanInProgress,
}

// ---------------------------------------------------------------------------
// SlaScheduler
// ---------------------------------------------------------------------------

/// State shared between the service object and the spawned tick loop.
struct Shared {
    next_run_at: Mutex<Option<Timestamp>>,
    last_summary: Mutex<Option<ScanSummary>>,
}

struct RunHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the recurring SLA scan timer.
pub struct SlaScheduler {
    scanner: Arc<SlaScanner>,
    interval: Duration,
    clock: Arc<dyn Clock>,
    /// Non-blocking overlap guard shared by the tick loop and `run_now`.
    scan_gate: Arc<tokio::sync::Mutex<()>>,
    running: AtomicBool,
    shared: Arc<Shared>,
    task: tokio::sync::Mutex<Option<RunHandle>>,
}

impl SlaScheduler {
    pub fn new(scanner: Arc<SlaScanner>, interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanner,
            interval,
            clock,
            scan_gate: Arc::new(tokio::sync::Mutex::new(())),
            running: AtomicBool::new(false),
            shared: Arc::new(Shared {
                next_run_at: Mutex::new(None),
                last_summary: Mutex::new(None),
            }),
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Start the tick loop. Idempotent: a second call while running is a
    /// no-op.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::debug!(job = SLA_SCAN_JOB_NAME, "Scheduler already running");
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            Arc::clone(&self.scanner),
            self.interval,
            Arc::clone(&self.clock),
            Arc::clone(&self.scan_gate),
            Arc::clone(&self.shared),
            cancel.clone(),
        ));

        self.running.store(true, Ordering::SeqCst);
        *task = Some(RunHandle { cancel, handle });
        tracing::info!(
            job = SLA_SCAN_JOB_NAME,
            interval_secs = self.interval.as_secs(),
            "SLA scheduler started"
        );
    }

    /// Stop the tick loop, waiting for any in-flight scan to finish.
    ///
    /// Cancellation is only observed between ticks, so a running scan always
    /// completes before this returns — no ledger update is cut off mid-write.
    pub async fn stop(&self) {
        let Some(run) = self.task.lock().await.take() else {
            tracing::debug!(job = SLA_SCAN_JOB_NAME, "Scheduler not running");
            return;
        };

        run.cancel.cancel();
        if let Err(e) = run.handle.await {
            tracing::error!(job = SLA_SCAN_JOB_NAME, error = %e, "Scheduler task ended abnormally");
        }

        self.running.store(false, Ordering::SeqCst);
        *lock_ignoring_poison(&self.shared.next_run_at) = None;
        tracing::info!(job = SLA_SCAN_JOB_NAME, "SLA scheduler stopped");
    }

    /// Execute one pass outside the normal cadence, under the same overlap
    /// guard as the timer.
    pub async fn run_now(&self) -> Result<ScanSummary, SchedulerError> {
        let Ok(_guard) = self.scan_gate.try_lock() else {
            return Err(SchedulerError::ScanInProgress);
        };

        tracing::info!(job = SLA_SCAN_JOB_NAME, "Manual SLA scan triggered");
        let summary = self.scanner.run_once().await;
        *lock_ignoring_poison(&self.shared.last_summary) = Some(summary);
        Ok(summary)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            job_name: SLA_SCAN_JOB_NAME,
            next_run_at: *lock_ignoring_poison(&self.shared.next_run_at),
            last_summary: *lock_ignoring_poison(&self.shared.last_summary),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick loop
// ---------------------------------------------------------------------------

async fn run_loop(
    scanner: Arc<SlaScanner>,
    interval: Duration,
    clock: Arc<dyn Clock>,
    scan_gate: Arc<tokio::sync::Mutex<()>>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    // Missed runs are combined into the next scheduled one, not queued.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(job = SLA_SCAN_JOB_NAME, "SLA scheduler cancelled");
                break;
            }
            _ = ticker.tick() => {
                let next = clock.now() + chrono::Duration::seconds(interval.as_secs() as i64);
                *lock_ignoring_poison(&shared.next_run_at) = Some(next);

                match scan_gate.try_lock() {
                    Ok(_guard) => {
                        if let Some(summary) = run_contained(Arc::clone(&scanner)).await {
                            *lock_ignoring_poison(&shared.last_summary) = Some(summary);
                        }
                    }
                    Err(_) => {
                        tracing::debug!(job = SLA_SCAN_JOB_NAME, "Scan still in flight, tick coalesced");
                    }
                }
            }
        }
    }
}

/// Run one pass in its own task so that even a panic inside the scanner is
/// logged and absorbed — the scheduler always survives to the next tick.
async fn run_contained(scanner: Arc<SlaScanner>) -> Option<ScanSummary> {
    match tokio::spawn(async move { scanner.run_once().await }).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            tracing::error!(job = SLA_SCAN_JOB_NAME, error = %e, "SLA scan pass aborted; scheduler continues");
            None
        }
    }
}

/// A poisoned lock only means another thread panicked mid-write of a `Copy`
/// value; the data is still usable.
fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
