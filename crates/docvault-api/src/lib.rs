//! # docvault-api
//!
//! HTTP API layer for DocVault. Exposes the folder and document services
//! over Axum: folder CRUD + move + ZIP export, document upload/versions/
//! download/move/copy, the maintenance sweep entry point, and health.
//!
//! Success responses use the `{"success": true, "data": ...}` envelope;
//! errors map through [`error::ApiError`] to an `{error, message}` payload.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;
