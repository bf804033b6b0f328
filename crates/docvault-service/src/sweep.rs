//! Best-effort storage operations and the deferred repair queue.
//!
//! Storage side effects that run after a metadata commit cannot be rolled
//! back into the transaction that spawned them. Failures land here: the
//! operation is queued as a [`SweepTask`] and retried by [`SweepService::run`],
//! the repair entry point exposed at `POST /api/maintenance/sweep`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docvault_core::result::AppResult;
use docvault_core::traits::storage::ObjectStore;
use docvault_database::repositories::sweep::SweepRepository;
use docvault_entity::sweep::model::{SweepKind, SweepTask};

/// Outcome of the post-commit object relocation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocationStatus {
    /// Every object was relocated.
    Complete,
    /// Metadata committed, but some objects still sit at their old keys.
    /// The failures are queued for repair.
    Partial {
        /// Number of objects that could not be relocated.
        failed: usize,
    },
}

impl RelocationStatus {
    /// Build a status from a failure count.
    pub fn from_failures(failed: usize) -> Self {
        if failed == 0 {
            Self::Complete
        } else {
            Self::Partial { failed }
        }
    }

    /// Whether every object made it.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Summary of one repair pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SweepReport {
    /// Tasks examined.
    pub processed: usize,
    /// Tasks that succeeded and were removed from the queue.
    pub repaired: usize,
    /// Tasks that failed again and stay queued.
    pub failed: usize,
}

/// Executes best-effort storage operations, queueing whatever fails.
#[derive(Clone)]
pub struct SweepService {
    sweep_repo: Arc<SweepRepository>,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for SweepService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepService").finish()
    }
}

impl SweepService {
    /// Creates a new sweep service.
    pub fn new(sweep_repo: Arc<SweepRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { sweep_repo, store }
    }

    /// Relocate objects via copy-then-delete. Failures are logged and
    /// queued; the returned count is how many pairs did not complete.
    pub async fn relocate_now(&self, pairs: &[(String, String)]) -> usize {
        let mut failed = 0;
        for (src, dst) in pairs {
            if let Err(e) = self.try_relocate(src, dst).await {
                failed += 1;
                warn!(src, dst, error = %e, "Object relocation failed; queueing for repair");
                if let Err(e) = self
                    .sweep_repo
                    .enqueue(SweepKind::Relocate, src, Some(dst), &e.to_string())
                    .await
                {
                    warn!(src, error = %e, "Failed to queue relocation repair");
                }
            }
        }
        failed
    }

    /// Delete objects best-effort. Failures are logged and queued; the
    /// returned count is how many deletions did not complete.
    pub async fn delete_now(&self, keys: &[String]) -> usize {
        let mut failed = 0;
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                failed += 1;
                warn!(key, error = %e, "Object deletion failed; queueing for repair");
                if let Err(e) = self
                    .sweep_repo
                    .enqueue(SweepKind::Delete, key, None, &e.to_string())
                    .await
                {
                    warn!(key, error = %e, "Failed to queue deletion repair");
                }
            }
        }
        failed
    }

    /// Drain the repair queue.
    pub async fn run(&self, limit: i64) -> AppResult<SweepReport> {
        let tasks = self.sweep_repo.list_pending(limit).await?;
        let mut report = SweepReport {
            processed: tasks.len(),
            repaired: 0,
            failed: 0,
        };

        for task in tasks {
            match self.repair(&task).await {
                Ok(()) => {
                    self.sweep_repo.complete(task.id).await?;
                    report.repaired += 1;
                }
                Err(e) => {
                    warn!(task_id = %task.id, error = %e, "Sweep repair failed");
                    self.sweep_repo.record_failure(task.id, &e.to_string()).await?;
                    report.failed += 1;
                }
            }
        }

        info!(
            processed = report.processed,
            repaired = report.repaired,
            failed = report.failed,
            "Sweep pass finished"
        );
        Ok(report)
    }

    async fn try_relocate(&self, src: &str, dst: &str) -> AppResult<()> {
        self.store.copy(src, dst).await?;
        self.store.delete(src).await
    }

    async fn repair(&self, task: &SweepTask) -> AppResult<()> {
        match task.kind {
            SweepKind::Relocate => {
                let dst = task.dst_key.as_deref().ok_or_else(|| {
                    docvault_core::AppError::internal("Relocate task without destination key")
                })?;
                // The copy may already have happened before the original
                // failure; an existing destination short-circuits to delete.
                if !self.store.exists(dst).await? {
                    self.store.copy(&task.src_key, dst).await?;
                }
                self.store.delete(&task.src_key).await
            }
            SweepKind::Delete => self.store.delete(&task.src_key).await,
        }
    }
}
