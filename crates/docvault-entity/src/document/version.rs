//! Document version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A historical version of a document.
///
/// Version rows are append-only: `object_key` is never rewritten to point
/// at different content, only relocated when the owning folder moves.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The document this version belongs to.
    pub document_id: Uuid,
    /// Sequential version number, starting at 1 with no gaps.
    pub version: i32,
    /// Object-storage key of this version's content.
    pub object_key: String,
    /// SHA-256 checksum (lowercase hex).
    pub checksum: String,
    /// Size in bytes.
    pub size: i64,
    /// User who uploaded this version.
    pub created_by: Uuid,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}
