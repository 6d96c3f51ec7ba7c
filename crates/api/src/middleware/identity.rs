//! Caller identity extractor.
//!
//! Authentication terminates at the upstream gateway, which injects the
//! authenticated user's id as an `x-user-id` header. Handlers that act on
//! behalf of a user take [`CallerIdentity`] as an extractor parameter:
//!
//! ```ignore
//! async fn my_handler(caller: CallerIdentity) -> AppResult<Json<()>> {
//!     tracing::info!(user_id = caller.user_id, "handling request");
//!     Ok(Json(()))
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing x-user-id header".into()))
            })?;

        let user_id: DbId = header.parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid x-user-id header: expected a numeric user id".into(),
            ))
        })?;

        Ok(CallerIdentity { user_id })
    }
}
