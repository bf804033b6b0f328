//! Maintenance handlers.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;

/// How many queued repairs one sweep request processes.
const SWEEP_BATCH: i64 = 100;

/// POST /api/maintenance/sweep
///
/// Repair entry point for storage operations that failed after their
/// metadata committed (pending relocations and deletions).
pub async fn sweep(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let report = state.sweep_service.run(SWEEP_BATCH).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": report })))
}
