//! Folder CRUD, move, stats, and archive handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::types::pagination::PageRequest;
use docvault_service::folder::service::CreateFolderRequest as SvcCreateFolder;

use crate::dto::request::{CreateFolderRequest, MoveFolderRequest, RenameFolderRequest};
use crate::error::ApiError;
use crate::extractors::Identity;
use crate::handlers::require_relocated;
use crate::state::AppState;

/// GET /api/folders
pub async fn list_roots(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folders = state.folder_service.list_roots(&ctx).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": folders }),
    ))
}

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state
        .folder_service
        .create_folder(
            &ctx,
            SvcCreateFolder {
                parent_id: req.parent_id,
                name: req.name,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.folder_service.get_folder(&ctx, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}/contents
pub async fn list_contents(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let contents = state.folder_service.list_contents(&ctx, id, page).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": contents }),
    ))
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.path_service.rename_folder(&ctx, id, &req.name).await?;
    require_relocated(outcome.relocation)?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": outcome.folder }),
    ))
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state
        .path_service
        .move_folder(&ctx, id, req.new_parent_id)
        .await?;
    require_relocated(outcome.relocation)?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": outcome.folder }),
    ))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.folder_service.delete_folder(&ctx, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Folder deleted" } }),
    ))
}

/// POST /api/folders/{id}/stats/recompute
pub async fn recompute_stats(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder = state.stats_service.recompute_folder(&ctx, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": folder })))
}

/// GET /api/folders/{id}/archive
pub async fn archive_folder(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let archive = state.archive_service.archive_folder(&ctx, id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", archive.filename),
        )
        .body(Body::from_stream(archive.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
