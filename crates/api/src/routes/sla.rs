//! Route definitions for the `/sla` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sla;
use crate::state::AppState;

/// Routes mounted at `/sla`.
///
/// ```text
/// GET    /status   -> scheduler_status
/// POST   /scan     -> run_scan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(sla::scheduler_status))
        .route("/scan", post(sla::run_scan))
}
