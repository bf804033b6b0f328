//! Sweep task entity — queued storage operations awaiting repair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The kind of storage operation a sweep task retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sweep_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    /// Copy `src_key` to `dst_key`, then delete `src_key`.
    Relocate,
    /// Delete `src_key`.
    Delete,
}

/// A storage operation that failed after its metadata transaction committed
/// and is queued for a later repair pass.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SweepTask {
    /// Unique task identifier.
    pub id: Uuid,
    /// What the repair pass should do.
    pub kind: SweepKind,
    /// The object key the operation reads from (or deletes).
    pub src_key: String,
    /// The destination key for relocations; null for deletes.
    pub dst_key: Option<String>,
    /// How many repair passes have already failed on this task.
    pub attempts: i32,
    /// The most recent failure message, if any.
    pub last_error: Option<String>,
    /// When the task was queued.
    pub created_at: DateTime<Utc>,
}
