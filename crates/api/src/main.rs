use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_api::config::ServerConfig;
use helpdesk_api::router::build_app_router;
use helpdesk_api::state::AppState;
use helpdesk_core::policy::SlaPolicySet;
use helpdesk_core::time::SystemClock;
use helpdesk_notify::{
    ChatWebhookConfig, ChatWebhookSender, DbRecipientResolver, Dispatcher, EmailConfig,
    EmailSender, InAppStore,
};
use helpdesk_sla::{SlaScanner, SlaScheduler};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let policies = SlaPolicySet::with_warning_ratio(config.sla_warning_ratio)
        .expect("SLA_WARNING_RATIO out of range");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = helpdesk_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    helpdesk_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    helpdesk_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Delivery channels ---
    let email = EmailConfig::from_env().map(EmailSender::new);
    let chat = ChatWebhookConfig::from_env().map(ChatWebhookSender::new);
    tracing::info!(
        email_configured = email.is_some(),
        chat_configured = chat.is_some(),
        "Delivery channels initialised"
    );
    let dispatcher = Dispatcher::new(email, chat, InAppStore::new(pool.clone()));

    // --- SLA engine ---
    let clock = Arc::new(SystemClock);
    let scanner = Arc::new(SlaScanner::new(
        pool.clone(),
        policies,
        clock.clone(),
        Arc::new(DbRecipientResolver::new(pool.clone())),
        dispatcher,
    ));
    let scheduler = Arc::new(SlaScheduler::new(
        scanner,
        Duration::from_secs(config.sla_scan_interval_secs),
        clock,
    ));
    scheduler.start().await;

    // --- App state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        scheduler: Arc::clone(&scheduler),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the scheduler under a bounded grace period. An in-flight scan is
    // allowed to finish; one that overruns the grace period is abandoned
    // loudly rather than silently dropped.
    let grace = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, scheduler.stop()).await.is_err() {
        tracing::warn!(
            grace_secs = grace.as_secs(),
            "SLA scan did not finish within the shutdown grace period"
        );
    } else {
        tracing::info!("SLA scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
