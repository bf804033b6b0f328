//! Document CRUD, upload, version, and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::types::pagination::PageRequest;
use docvault_service::document::download::DownloadResult;
use docvault_service::document::upload::UploadParams;

use crate::dto::request::{CopyDocumentRequest, MoveDocumentRequest, RenameDocumentRequest};
use crate::error::ApiError;
use crate::extractors::Identity;
use crate::handlers::require_relocated;
use crate::state::AppState;

/// GET /api/documents?folder_id=...
pub async fn list_documents(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(page): Query<PageRequest>,
    Query(filter): Query<std::collections::HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let folder_id = filter
        .get("folder_id")
        .ok_or_else(|| AppError::validation("folder_id query parameter is required"))?
        .parse::<Uuid>()
        .map_err(|_| AppError::validation("Invalid folder_id"))?;

    let result = state
        .document_service
        .list_documents(&ctx, folder_id, page)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": result })))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let document = state.document_service.get_document(&ctx, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": document }),
    ))
}

/// POST /api/documents/upload — multipart upload into a folder
pub async fn upload(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let parts = read_upload(multipart).await?;

    let folder_id = parts
        .folder_id
        .ok_or_else(|| AppError::validation("folder_id is required"))?;
    let file_name = parts
        .file_name
        .ok_or_else(|| AppError::validation("file is required"))?;
    let data = parts
        .data
        .ok_or_else(|| AppError::validation("file data is required"))?;

    let (document, version) = state
        .upload_service
        .upload(
            &ctx,
            UploadParams {
                folder_id,
                file_name,
                mime_type: parts.mime_type,
                data,
            },
        )
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "document": document, "version": version }
    })))
}

/// POST /api/documents/{id}/versions — multipart upload of a new version
pub async fn upload_version(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let parts = read_upload(multipart).await?;

    let data = parts
        .data
        .ok_or_else(|| AppError::validation("file data is required"))?;

    let (document, version) = state
        .upload_service
        .upload_version(&ctx, id, parts.mime_type, data)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "document": document, "version": version }
    })))
}

/// PUT /api/documents/{id}
pub async fn rename_document(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameDocumentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let document = state
        .document_service
        .rename_document(&ctx, id, &req.name)
        .await?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": document }),
    ))
}

/// PUT /api/documents/{id}/move
pub async fn move_document(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveDocumentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state
        .document_service
        .move_document(&ctx, id, req.target_folder_id)
        .await?;
    require_relocated(outcome.relocation)?;

    Ok(Json(
        serde_json::json!({ "success": true, "data": outcome.document }),
    ))
}

/// POST /api/documents/{id}/copy
pub async fn copy_document(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<CopyDocumentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let copy = state
        .document_service
        .copy_document(&ctx, id, req.target_folder_id)
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "data": copy })))
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.document_service.delete_document(&ctx, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Document deleted" } }),
    ))
}

/// GET /api/documents/{id}/download
pub async fn download(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let result = state.download_service.download(&ctx, id).await?;
    stream_response(result)
}

/// GET /api/documents/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let versions = state.version_service.list_versions(&ctx, id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": versions }),
    ))
}

/// GET /api/documents/{id}/versions/latest
pub async fn latest_version(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let version = state.version_service.latest_version(&ctx, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}

/// GET /api/documents/{id}/versions/{version}/download
pub async fn download_version(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path((id, version)): Path<(Uuid, i32)>,
) -> Result<Response, ApiError> {
    let result = state
        .download_service
        .download_version(&ctx, id, version)
        .await?;
    stream_response(result)
}

/// Collected multipart fields for the two upload endpoints.
struct UploadParts {
    folder_id: Option<Uuid>,
    file_name: Option<String>,
    mime_type: Option<String>,
    data: Option<Bytes>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadParts, ApiError> {
    let mut parts = UploadParts {
        folder_id: None,
        file_name: None,
        mime_type: None,
        data: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                parts.folder_id = Some(
                    Uuid::parse_str(&text)
                        .map_err(|_| AppError::validation("Invalid folder_id"))?,
                );
            }
            "file" => {
                parts.file_name = field.file_name().map(String::from);
                parts.mime_type = field.content_type().map(String::from);
                parts.data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    Ok(parts)
}

fn stream_response(result: DownloadResult) -> Result<Response, ApiError> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.filename),
        )
        .header(header::CONTENT_LENGTH, result.size)
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}
