//! Sweep task repository — persisted queue of storage repairs.

use sqlx::PgPool;
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_entity::sweep::model::{SweepKind, SweepTask};

/// Repository for the deferred storage-repair queue.
#[derive(Debug, Clone)]
pub struct SweepRepository {
    pool: PgPool,
}

impl SweepRepository {
    /// Create a new sweep repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue a storage operation for a later repair pass.
    pub async fn enqueue(
        &self,
        kind: SweepKind,
        src_key: &str,
        dst_key: Option<&str>,
        error: &str,
    ) -> AppResult<SweepTask> {
        sqlx::query_as::<_, SweepTask>(
            "INSERT INTO sweep_tasks (kind, src_key, dst_key, last_error) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(kind)
        .bind(src_key)
        .bind(dst_key)
        .bind(error)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue sweep task", e))
    }

    /// List pending tasks, oldest first.
    pub async fn list_pending(&self, limit: i64) -> AppResult<Vec<SweepTask>> {
        sqlx::query_as::<_, SweepTask>(
            "SELECT * FROM sweep_tasks ORDER BY created_at ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sweep tasks", e))
    }

    /// Remove a completed task.
    pub async fn complete(&self, task_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM sweep_tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to complete sweep task", e)
            })?;
        Ok(())
    }

    /// Record a failed repair attempt.
    pub async fn record_failure(&self, task_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE sweep_tasks SET attempts = attempts + 1, last_error = $2 WHERE id = $1",
        )
        .bind(task_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record sweep failure", e)
        })?;
        Ok(())
    }
}
