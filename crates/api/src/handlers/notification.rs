//! Handlers for the `/notifications` resource.
//!
//! All endpoints act on behalf of the caller identified by
//! [`CallerIdentity`].

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use helpdesk_core::error::CoreError;
use helpdesk_core::types::DbId;
use helpdesk_db::models::notification::{Notification, UpdatePreference};
use helpdesk_db::repositories::{NotificationPreferenceRepo, NotificationRepo};
use helpdesk_notify::{EffectivePreference, Frequency, NotificationCategory, PreferenceResolver};

use crate::error::{AppError, AppResult};
use crate::middleware::identity::CallerIdentity;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// In-app store
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the caller's in-app notifications with optional filtering.
pub async fn list_notifications(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        caller.user_id,
        query.unread_only.unwrap_or(false),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse {
        data: notifications,
    }))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = NotificationRepo::mark_read(&state.pool, id, caller.user_id).await?;
    if !updated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "notification",
            id,
        }));
    }
    Ok(Json(json!({ "data": { "read": true } })))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, caller.user_id).await?;
    Ok(Json(json!({ "data": { "marked_read": count } })))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, caller.user_id).await?;
    Ok(Json(json!({ "data": { "unread": count } })))
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/preferences
///
/// The caller's effective preference for every category — defaults merged
/// with any stored rows, security override applied.
pub async fn get_preferences(
    caller: CallerIdentity,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EffectivePreference>>>> {
    let mut effective = Vec::with_capacity(NotificationCategory::ALL.len());
    for category in NotificationCategory::ALL {
        effective.push(PreferenceResolver::resolve(&state.pool, caller.user_id, category).await?);
    }
    Ok(Json(DataResponse { data: effective }))
}

/// PUT /api/v1/notifications/preferences/{category}
///
/// Upsert the caller's stored preference row for one category and return
/// the resulting effective preference (which, for `security`, may differ
/// from what was stored).
pub async fn update_preference(
    caller: CallerIdentity,
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(update): Json<UpdatePreference>,
) -> AppResult<Json<DataResponse<EffectivePreference>>> {
    let category: NotificationCategory = category.parse().map_err(AppError::Core)?;

    // Reject malformed frequencies up front instead of storing them.
    if let Some(frequency) = &update.frequency {
        frequency
            .parse::<Frequency>()
            .map_err(AppError::Core)?;
    }

    NotificationPreferenceRepo::upsert(
        &state.pool,
        caller.user_id,
        category.as_str(),
        update.is_enabled,
        update.channel_email,
        update.channel_chat,
        update.channel_in_app,
        update.frequency.as_deref(),
    )
    .await?;

    let effective = PreferenceResolver::resolve(&state.pool, caller.user_id, category).await?;
    Ok(Json(DataResponse { data: effective }))
}
