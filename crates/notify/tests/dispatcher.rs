//! Integration tests for the dispatcher's per-channel isolation.
//!
//! Exercises the fan-out against a real database (in-app store) and a
//! deliberately unreachable chat webhook to verify that one broken channel
//! never prevents the others from delivering.

use chrono::{Duration, TimeZone, Utc};
use helpdesk_core::channels::{CHANNEL_CHAT, CHANNEL_EMAIL, CHANNEL_IN_APP};
use helpdesk_core::deadline;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::ticket::{SlaKind, SlaSeverity, SlaTicket, TicketPriority, TicketStatus};
use helpdesk_core::types::DbId;
use sqlx::PgPool;

use helpdesk_db::models::user::Recipient;
use helpdesk_db::repositories::{NotificationRepo, TicketRepo};
use helpdesk_notify::{
    ChatWebhookConfig, ChatWebhookSender, DeliveryOutcome, Dispatcher, EffectivePreference,
    Frequency, InAppStore, NotificationCategory, SlaNotice,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool) -> Recipient {
    let user_id: DbId =
        sqlx::query_scalar("INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id")
            .bind("agent@example.com")
            .bind("Agent")
            .fetch_one(pool)
            .await
            .expect("seed user");
    Recipient {
        user_id,
        email: "agent@example.com".to_string(),
        display_name: "Agent".to_string(),
    }
}

async fn seed_notice(pool: &PgPool) -> SlaNotice {
    let mut ticket = SlaTicket {
        id: 0,
        org_id: 1,
        subject: "dispatcher test".into(),
        priority: TicketPriority::Urgent,
        status: TicketStatus::Open,
        assignee_id: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
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

    let due_at = ticket.created_at + Duration::minutes(60);
    SlaNotice::new(&ticket, SlaKind::Response, SlaSeverity::Warning, due_at)
}

fn outcome_for<'a>(
    attempts: &'a [helpdesk_notify::DeliveryAttempt],
    channel: &str,
) -> &'a DeliveryOutcome {
    &attempts
        .iter()
        .find(|a| a.channel == channel)
        .expect("attempt for channel")
        .outcome
}

// ---------------------------------------------------------------------------
// Channel isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn broken_chat_channel_does_not_block_in_app(pool: PgPool) {
    let recipient = seed_user(&pool).await;
    let notice = seed_notice(&pool).await;

    // Unroutable webhook: every chat call fails fast with a connect error.
    let chat = ChatWebhookSender::new(ChatWebhookConfig {
        url: "http://127.0.0.1:9/hooks/sla".to_string(),
    });
    let dispatcher = Dispatcher::new(None, Some(chat), InAppStore::new(pool.clone()));

    let pref = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
    let attempts = dispatcher.dispatch(&recipient, &pref, &notice).await;

    // Email is enabled by preference but not configured for the deployment.
    assert_eq!(outcome_for(&attempts, CHANNEL_EMAIL), &DeliveryOutcome::Skipped);
    assert!(matches!(
        outcome_for(&attempts, CHANNEL_CHAT),
        DeliveryOutcome::Failed(_)
    ));
    assert_eq!(
        outcome_for(&attempts, CHANNEL_IN_APP),
        &DeliveryOutcome::Delivered
    );

    // The in-app row really landed.
    let count = NotificationRepo::unread_count(&pool, recipient.user_id)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Digest queueing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn digest_frequency_queues_in_app_and_skips_inline_sends(pool: PgPool) {
    let recipient = seed_user(&pool).await;
    let notice = seed_notice(&pool).await;

    let chat = ChatWebhookSender::new(ChatWebhookConfig {
        url: "http://127.0.0.1:9/hooks/sla".to_string(),
    });
    let dispatcher = Dispatcher::new(None, Some(chat), InAppStore::new(pool.clone()));

    let mut pref = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
    pref.frequency = Frequency::DailyDigest;

    let attempts = dispatcher.dispatch(&recipient, &pref, &notice).await;

    // Inline channels are skipped, not attempted, under a digest frequency.
    assert_eq!(outcome_for(&attempts, CHANNEL_EMAIL), &DeliveryOutcome::Skipped);
    assert_eq!(outcome_for(&attempts, CHANNEL_CHAT), &DeliveryOutcome::Skipped);
    assert_eq!(
        outcome_for(&attempts, CHANNEL_IN_APP),
        &DeliveryOutcome::Delivered
    );
}

// ---------------------------------------------------------------------------
// Disabled preference
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_preference_skips_every_channel(pool: PgPool) {
    let recipient = seed_user(&pool).await;
    let notice = seed_notice(&pool).await;

    let dispatcher = Dispatcher::new(None, None, InAppStore::new(pool.clone()));

    let mut pref = EffectivePreference::defaults(NotificationCategory::SlaAlerts);
    pref.is_enabled = false;

    let attempts = dispatcher.dispatch(&recipient, &pref, &notice).await;
    assert!(attempts
        .iter()
        .all(|a| a.outcome == DeliveryOutcome::Skipped));

    let count = NotificationRepo::unread_count(&pool, recipient.user_id)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
