//! Route definitions for the DocVault HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`. The router
//! receives `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(document_routes())
        .merge(maintenance_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Folder CRUD, move, stats recompute, ZIP export.
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", get(handlers::folder::list_roots))
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/{id}", get(handlers::folder::get_folder))
        .route("/folders/{id}", put(handlers::folder::rename_folder))
        .route("/folders/{id}", delete(handlers::folder::delete_folder))
        .route("/folders/{id}/contents", get(handlers::folder::list_contents))
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route("/folders/{id}/archive", get(handlers::folder::archive_folder))
        .route(
            "/folders/{id}/stats/recompute",
            post(handlers::folder::recompute_stats),
        )
}

/// Document CRUD, upload, versions, download, move/copy.
fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/documents", get(handlers::document::list_documents))
        .route("/documents/upload", post(handlers::document::upload))
        .route("/documents/{id}", get(handlers::document::get_document))
        .route("/documents/{id}", put(handlers::document::rename_document))
        .route("/documents/{id}", delete(handlers::document::delete_document))
        .route("/documents/{id}/move", put(handlers::document::move_document))
        .route("/documents/{id}/copy", post(handlers::document::copy_document))
        .route("/documents/{id}/download", get(handlers::document::download))
        .route("/documents/{id}/versions", get(handlers::document::list_versions))
        .route("/documents/{id}/versions", post(handlers::document::upload_version))
        .route(
            "/documents/{id}/versions/latest",
            get(handlers::document::latest_version),
        )
        .route(
            "/documents/{id}/versions/{version}/download",
            get(handlers::document::download_version),
        )
}

/// Maintenance endpoints.
fn maintenance_routes() -> Router<AppState> {
    Router::new().route("/maintenance/sweep", post(handlers::maintenance::sweep))
}

/// Health endpoints.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS layer from configuration; `*` means permissive.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors.allowed_origins;

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
