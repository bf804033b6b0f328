//! Path propagation — folder rename and move.
//!
//! Both operations validate structurally (no-op, collision, owner match,
//! cycle), then rewrite the folder, every descendant folder path, and every
//! affected object key in one metadata transaction, and finally relocate
//! the physical objects with copy-then-delete. The relocation step runs
//! after the commit: on failure the metadata keeps pointing at the new
//! keys, the failed pairs are queued for repair, and the caller sees a
//! [`RelocationStatus::Partial`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::events::DomainEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::folder::model::Folder;
use docvault_storage::keys;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;
use crate::folder::stats::StatsService;
use crate::naming;
use crate::notify::EventDispatcher;
use crate::sweep::{RelocationStatus, SweepService};

/// Result of a rename or move: the updated folder plus the outcome of the
/// post-commit object relocation.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The folder after the rewrite.
    pub folder: Folder,
    /// Whether every affected object reached its new key.
    pub relocation: RelocationStatus,
}

/// Propagates path changes through a folder subtree.
#[derive(Debug, Clone)]
pub struct PathPropagator {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Best-effort storage executor.
    sweep: Arc<SweepService>,
    /// Stats aggregator.
    stats: Arc<StatsService>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
    /// Event dispatcher.
    events: EventDispatcher,
}

impl PathPropagator {
    /// Creates a new path propagator.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        sweep: Arc<SweepService>,
        stats: Arc<StatsService>,
        access: Arc<dyn AccessOracle>,
        events: EventDispatcher,
    ) -> Self {
        Self {
            folder_repo,
            sweep,
            stats,
            access,
            events,
        }
    }

    /// Renames a folder, rewriting every descendant path and object key.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<RewriteOutcome> {
        naming::validate_name(new_name)?;

        let folder = load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::Edit, AccessResource::Folder(folder_id))
            .await?;

        if folder.name == new_name {
            return Err(AppError::conflict(format!(
                "Folder is already named '{new_name}'"
            )));
        }

        if self
            .folder_repo
            .find_sibling(ctx.owner_id, ctx.owner_type, folder.parent_id, new_name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "A folder named '{new_name}' already exists here"
            )));
        }

        let old_path = folder.path.clone();
        let new_path = replace_last_segment(&old_path, new_name);
        let old_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &old_path);
        let new_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &new_path);

        let rewrite = self
            .folder_repo
            .rename_subtree(
                folder_id,
                &[folder_id],
                new_name,
                &old_path,
                &new_path,
                &old_prefix,
                &new_prefix,
            )
            .await?;

        let failed = self.sweep.relocate_now(&rewrite.relocations).await;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_path = %old_path,
            new_path = %new_path,
            objects = rewrite.relocations.len(),
            relocation_failures = failed,
            "Folder renamed"
        );

        self.events.dispatch(DomainEvent::FolderRenamed {
            folder_id,
            old_path,
            new_path,
            actor: ctx.user_id,
        });

        Ok(RewriteOutcome {
            folder: rewrite.folder,
            relocation: RelocationStatus::from_failures(failed),
        })
    }

    /// Moves a folder under a new parent, rewriting every descendant path
    /// and object key.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_parent_id: Uuid,
    ) -> AppResult<RewriteOutcome> {
        let folder = load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::Edit, AccessResource::Folder(folder_id))
            .await?;

        if folder_id == new_parent_id {
            return Err(AppError::conflict("Cannot move a folder into itself"));
        }

        let target = self
            .folder_repo
            .find_by_id(new_parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Target folder not found"))?;

        if !target.same_owner(&folder) || !ctx.owns(&target) {
            return Err(AppError::not_found("Target folder not found"));
        }

        self.access
            .require(ctx.user_id, AccessAction::Edit, AccessResource::Folder(new_parent_id))
            .await?;

        if folder.parent_id == Some(new_parent_id) {
            return Err(AppError::conflict("Folder is already in that location"));
        }

        self.reject_cycle(&folder, &target).await?;

        if self
            .folder_repo
            .find_sibling(ctx.owner_id, ctx.owner_type, Some(new_parent_id), &folder.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists in the target folder",
                folder.name
            )));
        }

        let old_parent_id = folder.parent_id;
        let old_path = folder.path.clone();
        let new_path = format!("{}/{}", target.path, folder.name);
        let old_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &old_path);
        let new_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &new_path);

        let mut lock_ids = vec![folder_id, new_parent_id];
        lock_ids.sort();

        let rewrite = self
            .folder_repo
            .move_subtree(
                folder_id,
                &lock_ids,
                new_parent_id,
                &old_path,
                &new_path,
                &old_prefix,
                &new_prefix,
            )
            .await?;

        let failed = self.sweep.relocate_now(&rewrite.relocations).await;

        // The moved subtree's own stats are unchanged; both parent chains
        // gained or lost the subtree's documents.
        if let Some(parent_id) = old_parent_id {
            self.stats.refresh(parent_id).await;
        }
        self.stats.refresh(new_parent_id).await;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_path = %old_path,
            new_path = %new_path,
            objects = rewrite.relocations.len(),
            relocation_failures = failed,
            "Folder moved"
        );

        self.events.dispatch(DomainEvent::FolderMoved {
            folder_id,
            old_path,
            new_path,
            actor: ctx.user_id,
        });

        Ok(RewriteOutcome {
            folder: rewrite.folder,
            relocation: RelocationStatus::from_failures(failed),
        })
    }

    /// Walk the target's ancestor chain; finding the moved folder there
    /// means the move would create a cycle.
    async fn reject_cycle(&self, folder: &Folder, target: &Folder) -> AppResult<()> {
        let mut seen = HashSet::new();
        let mut cursor = target.parent_id;

        while let Some(ancestor_id) = cursor {
            if ancestor_id == folder.id {
                return Err(AppError::conflict(
                    "Cannot move a folder into one of its own descendants",
                ));
            }
            if !seen.insert(ancestor_id) {
                // Corrupt parent chain; stop walking rather than spin.
                break;
            }
            cursor = self
                .folder_repo
                .find_by_id(ancestor_id)
                .await?
                .and_then(|f| f.parent_id);
        }

        Ok(())
    }
}

/// Replace the last `/`-separated segment of a materialized path.
fn replace_last_segment(path: &str, new_name: &str) -> String {
    match path.rfind('/') {
        Some(idx) => format!("{}/{}", &path[..idx], new_name),
        None => format!("/{new_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_last_segment() {
        assert_eq!(replace_last_segment("/a/b/c", "z"), "/a/b/z");
        assert_eq!(replace_last_segment("/a", "z"), "/z");
    }
}
