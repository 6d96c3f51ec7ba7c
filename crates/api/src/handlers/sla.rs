//! Handlers for the `/sla` resource: scheduler status and the manual scan
//! trigger.

use axum::extract::State;
use axum::Json;
use helpdesk_core::error::CoreError;
use helpdesk_sla::{ScanSummary, SchedulerError, SchedulerStatus};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sla/status
///
/// Scheduler snapshot: running flag, job name, next fire time, last batch
/// summary.
pub async fn scheduler_status(State(state): State<AppState>) -> Json<DataResponse<SchedulerStatus>> {
    Json(DataResponse {
        data: state.scheduler.status(),
    })
}

/// POST /api/v1/sla/scan
///
/// Run one SLA scan pass outside the normal cadence and return its summary
/// synchronously. Subject to the same overlap prevention as timer ticks:
/// a pass already in flight yields 409.
pub async fn run_scan(State(state): State<AppState>) -> AppResult<Json<DataResponse<ScanSummary>>> {
    match state.scheduler.run_now().await {
        Ok(summary) => Ok(Json(DataResponse { data: summary })),
        Err(SchedulerError::ScanInProgress) => Err(AppError::Core(CoreError::Conflict(
            "an SLA scan is already in progress".into(),
        ))),
    }
}
