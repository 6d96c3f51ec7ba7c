use std::sync::Arc;

use helpdesk_sla::SlaScheduler;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: helpdesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The SLA scan scheduler service object.
    pub scheduler: Arc<SlaScheduler>,
}
