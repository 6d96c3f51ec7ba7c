pub mod health;
pub mod notification;
pub mod sla;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sla/status                          scheduler snapshot (GET)
/// /sla/scan                            manual scan trigger (POST)
///
/// /notifications                       list (GET)
/// /notifications/read-all              mark all read (POST)
/// /notifications/unread-count          unread counter (GET)
/// /notifications/{id}/read             mark one read (POST)
/// /notifications/preferences           effective preferences (GET)
/// /notifications/preferences/{category}  upsert stored row (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sla", sla::router())
        .nest("/notifications", notification::router())
}
