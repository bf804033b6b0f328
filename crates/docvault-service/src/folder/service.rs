//! Folder CRUD operations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::events::DomainEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::document::model::Document;
use docvault_entity::folder::model::{CreateFolder, Folder};

use crate::context::RequestContext;
use crate::naming;
use crate::notify::EventDispatcher;

/// Load a folder and verify it belongs to the request's tenant.
///
/// Folders of other tenants are reported as absent rather than forbidden.
pub(crate) async fn load_owned_folder(
    folder_repo: &FolderRepository,
    ctx: &RequestContext,
    folder_id: Uuid,
) -> AppResult<Folder> {
    let folder = folder_repo
        .find_by_id(folder_id)
        .await?
        .filter(|f| ctx.owns(f))
        .ok_or_else(|| AppError::not_found("Folder not found"))?;
    Ok(folder)
}

/// A folder listing: direct subfolders plus direct documents.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FolderContents {
    /// The folder being listed.
    pub folder: Folder,
    /// Direct subfolders (paginated).
    pub subfolders: PageResponse<Folder>,
    /// Direct documents (paginated).
    pub documents: PageResponse<Document>,
}

/// Request to create a new folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateFolderRequest {
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
}

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Document repository (for delete guards and contents listing).
    document_repo: Arc<DocumentRepository>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
    /// Event dispatcher.
    events: EventDispatcher,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        document_repo: Arc<DocumentRepository>,
        access: Arc<dyn AccessOracle>,
        events: EventDispatcher,
    ) -> Self {
        Self {
            folder_repo,
            document_repo,
            access,
            events,
        }
    }

    /// Lists root folders for the request's tenant.
    pub async fn list_roots(&self, ctx: &RequestContext) -> AppResult<Vec<Folder>> {
        self.folder_repo
            .find_roots(ctx.owner_id, ctx.owner_type)
            .await
    }

    /// Gets a folder by ID.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        let folder = load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::View, AccessResource::Folder(folder_id))
            .await?;

        Ok(folder)
    }

    /// Lists a folder's direct subfolders and documents.
    pub async fn list_contents(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        page: PageRequest,
    ) -> AppResult<FolderContents> {
        let folder = self.get_folder(ctx, folder_id).await?;

        let subfolders = self.folder_repo.find_children(folder_id, &page).await?;
        let documents = self.document_repo.find_by_folder(folder_id, &page).await?;

        Ok(FolderContents {
            folder,
            subfolders,
            documents,
        })
    }

    /// Creates a new folder.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        naming::validate_name(&req.name)?;

        let path = if let Some(parent_id) = req.parent_id {
            let parent = load_owned_folder(&self.folder_repo, ctx, parent_id).await?;

            self.access
                .require(ctx.user_id, AccessAction::Edit, AccessResource::Folder(parent_id))
                .await?;

            format!("{}/{}", parent.path, req.name)
        } else {
            format!("/{}", req.name)
        };

        // Check for a sibling name conflict before touching anything.
        if self
            .folder_repo
            .find_sibling(ctx.owner_id, ctx.owner_type, req.parent_id, &req.name)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "A folder named '{}' already exists here",
                req.name
            )));
        }

        let folder = self
            .folder_repo
            .create(&CreateFolder {
                name: req.name,
                path,
                parent_id: req.parent_id,
                owner_id: ctx.owner_id,
                owner_type: ctx.owner_type,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );

        self.events.dispatch(DomainEvent::FolderCreated {
            folder_id: folder.id,
            path: folder.path.clone(),
            actor: ctx.user_id,
        });

        Ok(folder)
    }

    /// Deletes a folder.
    ///
    /// Deletion never cascades: a folder holding any direct subfolder or
    /// document is rejected with `Conflict` and left untouched.
    pub async fn delete_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<()> {
        let folder = load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::Delete, AccessResource::Folder(folder_id))
            .await?;

        if self.folder_repo.count_children(folder_id).await? > 0 {
            return Err(AppError::conflict(
                "Folder still contains subfolders; empty it first",
            ));
        }
        if self.document_repo.count_in_folder(folder_id).await? > 0 {
            return Err(AppError::conflict(
                "Folder still contains documents; empty it first",
            ));
        }

        self.folder_repo.delete(folder_id).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            path = %folder.path,
            "Folder deleted"
        );

        self.events.dispatch(DomainEvent::FolderDeleted {
            folder_id,
            path: folder.path,
            actor: ctx.user_id,
        });

        Ok(())
    }
}
