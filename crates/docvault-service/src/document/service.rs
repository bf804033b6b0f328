//! Core document operations — get, list, rename, move, copy, delete.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::events::DomainEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_core::traits::storage::ObjectStore;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::document::model::{CreateDocument, Document};
use docvault_entity::folder::model::Folder;
use docvault_storage::keys;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;
use crate::folder::stats::StatsService;
use crate::naming;
use crate::notify::EventDispatcher;
use crate::sweep::{RelocationStatus, SweepService};

/// Result of a document move: the updated document plus the outcome of the
/// post-commit object relocation.
#[derive(Debug, Clone)]
pub struct DocumentMoveOutcome {
    /// The document after the move.
    pub document: Document,
    /// Whether every version object reached its new key.
    pub relocation: RelocationStatus,
}

/// Handles document CRUD beyond uploads.
#[derive(Clone)]
pub struct DocumentService {
    /// Document repository.
    document_repo: Arc<DocumentRepository>,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Object store.
    store: Arc<dyn ObjectStore>,
    /// Best-effort storage executor.
    sweep: Arc<SweepService>,
    /// Stats aggregator.
    stats: Arc<StatsService>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
    /// Event dispatcher.
    events: EventDispatcher,
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService").finish()
    }
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        folder_repo: Arc<FolderRepository>,
        store: Arc<dyn ObjectStore>,
        sweep: Arc<SweepService>,
        stats: Arc<StatsService>,
        access: Arc<dyn AccessOracle>,
        events: EventDispatcher,
    ) -> Self {
        Self {
            document_repo,
            folder_repo,
            store,
            sweep,
            stats,
            access,
            events,
        }
    }

    /// Gets a document by ID.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Document> {
        let (document, _) = self
            .load_checked(ctx, document_id, AccessAction::View)
            .await?;
        Ok(document)
    }

    /// Lists documents in a folder with pagination.
    pub async fn list_documents(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::View, AccessResource::Folder(folder_id))
            .await?;

        self.document_repo.find_by_folder(folder_id, &page).await
    }

    /// Renames a document (metadata only; object keys keep the name the
    /// content was uploaded under).
    pub async fn rename_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        new_name: &str,
    ) -> AppResult<Document> {
        naming::validate_name(new_name)?;

        let (document, _) = self
            .load_checked(ctx, document_id, AccessAction::Edit)
            .await?;

        if let Some(existing) = self
            .document_repo
            .find_by_folder_and_name(document.folder_id, new_name)
            .await?
        {
            if existing.id != document_id {
                return Err(AppError::conflict(format!(
                    "A document named '{new_name}' already exists in this folder"
                )));
            }
        }

        let document = self.document_repo.rename(document_id, new_name).await?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            new_name = %new_name,
            "Document renamed"
        );

        Ok(document)
    }

    /// Moves a document into another folder, relocating every version
    /// object under the target folder's key prefix.
    pub async fn move_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        target_folder_id: Uuid,
    ) -> AppResult<DocumentMoveOutcome> {
        let (document, source_folder) = self
            .load_checked(ctx, document_id, AccessAction::Edit)
            .await?;

        if document.folder_id == target_folder_id {
            return Err(AppError::conflict("Document is already in that folder"));
        }

        let target = load_owned_folder(&self.folder_repo, ctx, target_folder_id).await?;

        self.access
            .require(
                ctx.user_id,
                AccessAction::Edit,
                AccessResource::Folder(target_folder_id),
            )
            .await?;

        if !target.same_owner(&source_folder) {
            return Err(AppError::not_found("Target folder not found"));
        }

        if let Some(existing) = self
            .document_repo
            .find_by_folder_and_name(target_folder_id, &document.file_name)
            .await?
        {
            if existing.id != document_id {
                return Err(AppError::conflict(format!(
                    "A document named '{}' already exists in the target folder",
                    document.file_name
                )));
            }
        }

        let old_prefix = keys::document_prefix(
            &keys::folder_prefix(
                source_folder.owner_type,
                source_folder.owner_id,
                &source_folder.path,
            ),
            document_id,
        );
        let new_prefix = keys::document_prefix(
            &keys::folder_prefix(target.owner_type, target.owner_id, &target.path),
            document_id,
        );

        let (document, relocations) = self
            .document_repo
            .move_document(document_id, target_folder_id, &old_prefix, &new_prefix)
            .await?;

        let failed = self.sweep.relocate_now(&relocations).await;

        self.stats.refresh(source_folder.id).await;
        self.stats.refresh(target.id).await;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            from_folder = %source_folder.id,
            to_folder = %target.id,
            objects = relocations.len(),
            relocation_failures = failed,
            "Document moved"
        );

        self.events.dispatch(DomainEvent::DocumentMoved {
            document_id,
            from_folder_id: source_folder.id,
            to_folder_id: target.id,
            actor: ctx.user_id,
        });

        Ok(DocumentMoveOutcome {
            document,
            relocation: RelocationStatus::from_failures(failed),
        })
    }

    /// Copies a document into a target folder under a new identity.
    ///
    /// The copy is a physical duplicate of the latest version and starts
    /// its own history at version 1. Its name is chosen by the bounded
    /// `Copy of` scheme with a timestamp fallback.
    pub async fn copy_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        target_folder_id: Uuid,
    ) -> AppResult<Document> {
        let (source, source_folder) = self
            .load_checked(ctx, document_id, AccessAction::View)
            .await?;

        let target = load_owned_folder(&self.folder_repo, ctx, target_folder_id).await?;

        self.access
            .require(
                ctx.user_id,
                AccessAction::Edit,
                AccessResource::Folder(target_folder_id),
            )
            .await?;

        if !target.same_owner(&source_folder) {
            return Err(AppError::not_found("Target folder not found"));
        }

        let new_name = self.pick_copy_name(&source.file_name, target_folder_id).await?;

        let new_id = Uuid::new_v4();
        let folder_prefix = keys::folder_prefix(target.owner_type, target.owner_id, &target.path);
        let document_prefix = keys::document_prefix(&folder_prefix, new_id);
        let object_key = keys::version_key(&document_prefix, 1, &new_name);

        self.store.copy(&source.object_key, &object_key).await?;

        let created = self
            .document_repo
            .create_with_version(&CreateDocument {
                id: new_id,
                folder_id: target_folder_id,
                file_name: new_name,
                original_name: source.original_name.clone(),
                object_key: object_key.clone(),
                checksum: source.checksum.clone(),
                size: source.size,
                mime_type: source.mime_type.clone(),
                created_by: ctx.user_id,
            })
            .await;

        let (copy, _) = match created {
            Ok(pair) => pair,
            Err(e) => {
                // Compensating delete of the freshly-copied object.
                let _ = self.store.delete(&object_key).await;
                return Err(e);
            }
        };

        self.stats.refresh(target.id).await;

        info!(
            user_id = %ctx.user_id,
            source_id = %document_id,
            new_id = %copy.id,
            file_name = %copy.file_name,
            "Document copied"
        );

        self.events.dispatch(DomainEvent::DocumentCopied {
            source_document_id: document_id,
            new_document_id: copy.id,
            to_folder_id: target.id,
            actor: ctx.user_id,
        });

        Ok(copy)
    }

    /// Deletes a document, all its version rows, and (best-effort) every
    /// version object in storage.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<()> {
        let (document, folder) = self
            .load_checked(ctx, document_id, AccessAction::Delete)
            .await?;

        let versions = self.document_repo.find_versions(document_id).await?;
        let mut object_keys: Vec<String> =
            versions.into_iter().map(|v| v.object_key).collect();

        // Also sweep strays under the document's key prefix (objects
        // orphaned by interrupted uploads that never got a version row).
        let document_prefix = keys::document_prefix(
            &keys::folder_prefix(folder.owner_type, folder.owner_id, &folder.path),
            document_id,
        );
        match self.store.list_by_prefix(&document_prefix).await {
            Ok(strays) => {
                for key in strays {
                    if !object_keys.contains(&key) {
                        object_keys.push(key);
                    }
                }
            }
            Err(e) => {
                warn!(document_id = %document_id, error = %e, "Could not list stray objects");
            }
        }

        // Storage cleanup first, best-effort: failures are queued for the
        // sweep pass and never block the metadata delete.
        self.sweep.delete_now(&object_keys).await;

        self.document_repo.delete_with_versions(document_id).await?;

        self.stats.refresh(folder.id).await;

        info!(
            user_id = %ctx.user_id,
            document_id = %document_id,
            file_name = %document.file_name,
            versions = object_keys.len(),
            "Document deleted"
        );

        self.events.dispatch(DomainEvent::DocumentDeleted {
            document_id,
            file_name: document.file_name,
            folder_id: folder.id,
            actor: ctx.user_id,
        });

        Ok(())
    }

    /// Load a document plus its folder, verifying tenant ownership and the
    /// required permission.
    pub(crate) async fn load_checked(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        action: AccessAction,
    ) -> AppResult<(Document, Folder)> {
        let document = self
            .document_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        let folder = load_owned_folder(&self.folder_repo, ctx, document.folder_id).await?;

        self.access
            .require(ctx.user_id, action, AccessResource::Document(document_id))
            .await?;

        Ok((document, folder))
    }

    /// Pick a free `Copy of` name in the target folder.
    async fn pick_copy_name(&self, original: &str, folder_id: Uuid) -> AppResult<String> {
        for attempt in 0..naming::MAX_COPY_ATTEMPTS {
            let candidate = naming::copy_candidate(original, attempt);
            if self
                .document_repo
                .find_by_folder_and_name(folder_id, &candidate)
                .await?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        Ok(naming::copy_fallback(original, Utc::now()))
    }
}
