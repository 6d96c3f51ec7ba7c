//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require the gateway-injected caller identity.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                          -> list_notifications
/// POST   /read-all                  -> mark_all_read
/// GET    /unread-count              -> unread_count
/// POST   /{id}/read                 -> mark_read
///
/// GET    /preferences               -> get_preferences
/// PUT    /preferences/{category}    -> update_preference
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/read-all", post(notification::mark_all_read))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
        .route("/preferences", get(notification::get_preferences))
        .route(
            "/preferences/{category}",
            put(notification::update_preference),
        )
}
