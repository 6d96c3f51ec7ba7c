//! One batch pass over all SLA-eligible tickets.
//!
//! The scanner classifies each ticket with the pure detector and, for every
//! newly crossed threshold, routes a notification and then stamps the dedup
//! marker with a single conditional update. Failures are contained to the
//! smallest unit: a broken channel degrades one delivery, a broken ticket
//! degrades one ticket, and the pass always runs to completion and reports
//! a summary.

use std::sync::Arc;

use helpdesk_core::detector::classify;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::ticket::{SlaKind, SlaSeverity, SlaTicket};
use helpdesk_core::time::Clock;
use helpdesk_core::types::Timestamp;
use helpdesk_db::models::ticket::TicketSlaRow;
use helpdesk_db::repositories::TicketRepo;
use helpdesk_db::DbPool;
use helpdesk_notify::{DeliveryAttempt, Dispatcher, PreferenceResolver, RecipientResolver, SlaNotice};
use serde::Serialize;
use uuid::Uuid;

/// Counts reported by one scan pass. Surfaced through the manual trigger
/// response and the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub tickets_examined: u32,
    pub warnings_sent: u32,
    pub breaches_sent: u32,
    pub errors: u32,
}

#[derive(Debug, Default, Clone, Copy)]
struct TicketOutcome {
    warnings: u32,
    breaches: u32,
}

/// Scans all eligible tickets and dispatches deduplicated notifications.
pub struct SlaScanner {
    pool: DbPool,
    policies: SlaPolicySet,
    clock: Arc<dyn Clock>,
    recipients: Arc<dyn RecipientResolver>,
    dispatcher: Dispatcher,
}

impl SlaScanner {
    pub fn new(
        pool: DbPool,
        policies: SlaPolicySet,
        clock: Arc<dyn Clock>,
        recipients: Arc<dyn RecipientResolver>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            pool,
            policies,
            clock,
            recipients,
            dispatcher,
        }
    }

    /// Run one full pass. Never fails: every error is absorbed into the
    /// summary's error count.
    pub async fn run_once(&self) -> ScanSummary {
        let scan_id = Uuid::new_v4();
        let now = self.clock.now();
        let mut summary = ScanSummary::default();

        let rows = match TicketRepo::find_sla_eligible(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(%scan_id, error = %e, "SLA scan could not load eligible tickets");
                summary.errors += 1;
                return summary;
            }
        };

        summary.tickets_examined = rows.len() as u32;

        for row in rows {
            let ticket_id = row.id;
            match self.process_ticket(row, now).await {
                Ok(outcome) => {
                    summary.warnings_sent += outcome.warnings;
                    summary.breaches_sent += outcome.breaches;
                }
                Err(e) => {
                    summary.errors += 1;
                    tracing::error!(%scan_id, ticket_id, error = %e, "Ticket skipped during SLA scan");
                }
            }
        }

        tracing::info!(
            %scan_id,
            tickets_examined = summary.tickets_examined,
            warnings_sent = summary.warnings_sent,
            breaches_sent = summary.breaches_sent,
            errors = summary.errors,
            "SLA scan pass complete"
        );

        summary
    }

    /// Classify one ticket and act on anything due.
    async fn process_ticket(
        &self,
        row: TicketSlaRow,
        now: Timestamp,
    ) -> anyhow::Result<TicketOutcome> {
        let ticket = row.into_domain()?;

        // A priority with no policy entry means the deadlines on this row
        // cannot be trusted; skip the ticket for this pass without writing
        // markers so it is retried once configuration is fixed.
        self.policies.target_for(ticket.priority)?;

        let assessment = classify(&ticket, now, self.policies.warning_ratio());
        let mut outcome = TicketOutcome::default();

        for kind in SlaKind::ALL {
            let Some(severity) = assessment.state_for(kind).due_severity() else {
                continue;
            };
            let Some(due_at) = ticket.due_at(kind) else {
                continue;
            };

            let sent = self.notify_and_mark(&ticket, kind, severity, due_at, now).await?;
            if sent {
                match severity {
                    SlaSeverity::Warning => outcome.warnings += 1,
                    SlaSeverity::Breach => outcome.breaches += 1,
                }

                // A breach recorded before any warning fired also stamps the
                // warning marker (no warning is sent — the breach supersedes
                // it), keeping the ledger monotonic: warning ≤ breach
                // whenever both exist.
                if severity == SlaSeverity::Breach
                    && ticket.marker(kind, SlaSeverity::Warning).is_none()
                {
                    TicketRepo::mark_notification_sent(
                        &self.pool,
                        ticket.id,
                        kind,
                        SlaSeverity::Warning,
                        now,
                    )
                    .await?;
                }
            }
        }

        Ok(outcome)
    }

    /// Route one crossing to every recipient, then conditionally stamp the
    /// marker. Returns whether this pass claimed the crossing.
    async fn notify_and_mark(
        &self,
        ticket: &SlaTicket,
        kind: SlaKind,
        severity: SlaSeverity,
        due_at: Timestamp,
        now: Timestamp,
    ) -> anyhow::Result<bool> {
        let notice = SlaNotice::new(ticket, kind, severity, due_at);
        let category = notice.category();
        let recipients = self.recipients.recipients(ticket).await?;

        let mut delivered_any = false;
        let mut failed_any = false;

        for recipient in &recipients {
            let pref = PreferenceResolver::resolve(&self.pool, recipient.user_id, category).await?;
            let attempts = self.dispatcher.dispatch(recipient, &pref, &notice).await;
            delivered_any |= attempts.iter().any(DeliveryAttempt::is_delivered);
            failed_any |= attempts.iter().any(DeliveryAttempt::is_failed);
        }

        // Leave the marker unset only when delivery was attempted and every
        // attempt failed: the next pass retries the send (at-least-once under
        // failure, at-most-once under success). A crossing with nothing to
        // deliver — no recipients, or every channel skipped by preference —
        // still counts as handled.
        if failed_any && !delivered_any {
            tracing::warn!(
                ticket_id = ticket.id,
                kind = %kind,
                severity = %severity,
                "Every delivery attempt failed; crossing will be retried next pass"
            );
            return Ok(false);
        }

        let marked =
            TicketRepo::mark_notification_sent(&self.pool, ticket.id, kind, severity, now).await?;
        if !marked {
            tracing::debug!(
                ticket_id = ticket.id,
                kind = %kind,
                severity = %severity,
                "Marker already recorded by a concurrent pass"
            );
        }
        Ok(marked)
    }
}
