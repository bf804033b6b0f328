//! Stats aggregation — denormalized `file_count` / `total_size` rollups.
//!
//! Recomputation is never incremental: every call derives the aggregate
//! from scratch over the folder's whole subtree, which makes it idempotent
//! and self-correcting no matter what triggered it. Failures are logged
//! warnings; the mutation that triggered the refresh has already succeeded
//! and is never rolled back over stats.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::folder::model::Folder;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;

/// Recomputes folder document counts and sizes.
#[derive(Debug, Clone)]
pub struct StatsService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
}

impl StatsService {
    /// Creates a new stats service.
    pub fn new(folder_repo: Arc<FolderRepository>) -> Self {
        Self { folder_repo }
    }

    /// Refresh stats for a folder and its whole ancestor chain.
    ///
    /// Walks `parent_id` upward with an explicit worklist; a corrupt chain
    /// terminates the walk instead of spinning. All failures are swallowed
    /// with a warning.
    pub async fn refresh(&self, folder_id: Uuid) {
        let mut seen = HashSet::new();
        let mut cursor = Some(folder_id);

        while let Some(id) = cursor {
            if !seen.insert(id) {
                warn!(folder_id = %id, "Parent chain revisited a folder; stopping stats walk");
                break;
            }

            let folder = match self.folder_repo.find_by_id(id).await {
                Ok(Some(folder)) => folder,
                Ok(None) => break,
                Err(e) => {
                    warn!(folder_id = %id, error = %e, "Stats refresh could not load folder");
                    break;
                }
            };

            match self
                .folder_repo
                .recompute_stats(folder.id, folder.owner_id, folder.owner_type, &folder.path)
                .await
            {
                Ok((file_count, total_size)) => {
                    debug!(folder_id = %id, file_count, total_size, "Stats recomputed");
                }
                Err(e) => {
                    warn!(folder_id = %id, error = %e, "Stats recompute failed");
                    break;
                }
            }

            cursor = folder.parent_id;
        }
    }

    /// Explicit recompute entry point; returns the refreshed folder.
    pub async fn recompute_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Folder> {
        load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.refresh(folder_id).await;

        load_owned_folder(&self.folder_repo, ctx, folder_id).await
    }
}
