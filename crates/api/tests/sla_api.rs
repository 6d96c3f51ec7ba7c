//! Integration tests for the `/sla` endpoints: manual scan trigger and
//! scheduler status.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get, post, seed_user};
use helpdesk_core::deadline;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::ticket::{SlaTicket, TicketPriority, TicketStatus};
use helpdesk_core::types::DbId;
use helpdesk_db::repositories::TicketRepo;
use sqlx::PgPool;

/// Insert an urgent ticket created `minutes_ago` minutes before now.
async fn seed_urgent_ticket(pool: &PgPool, assignee_id: Option<DbId>, minutes_ago: i64) -> DbId {
    let mut ticket = SlaTicket {
        id: 0,
        org_id: 1,
        subject: "api scan test".into(),
        priority: TicketPriority::Urgent,
        status: TicketStatus::Open,
        assignee_id,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
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
    TicketRepo::insert(pool, &ticket).await.expect("seed ticket")
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn status_reports_job_name_and_running_flag(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/sla/status").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["running"], false);
    assert_eq!(json["data"]["job_name"], "sla-deadline-scan");
}

// ---------------------------------------------------------------------------
// Manual trigger
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn manual_scan_on_empty_db_returns_zero_counts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/sla/scan").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["tickets_examined"], 0);
    assert_eq!(json["data"]["warnings_sent"], 0);
    assert_eq!(json["data"]["breaches_sent"], 0);
    assert_eq!(json["data"]["errors"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn manual_scan_sends_due_warning_and_publishes_summary(pool: PgPool) {
    let agent = seed_user(&pool, "agent@example.com").await;
    // 45 of 60 minutes elapsed on the response clock: warning due.
    seed_urgent_ticket(&pool, Some(agent), 45).await;

    let app = common::build_test_app(pool.clone());
    let response = post(app.clone(), "/api/v1/sla/scan").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["tickets_examined"], 1);
    assert_eq!(json["data"]["warnings_sent"], 1);
    assert_eq!(json["data"]["breaches_sent"], 0);

    // The summary shows up on the status surface afterwards.
    let response = get(app.clone(), "/api/v1/sla/status").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["last_summary"]["warnings_sent"], 1);

    // A second scan over unchanged time sends nothing new.
    let response = post(app, "/api/v1/sla/scan").await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["warnings_sent"], 0);
    assert_eq!(json["data"]["breaches_sent"], 0);
}
