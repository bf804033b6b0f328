//! Document version history — list, latest, lookup.

use std::sync::Arc;

use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::document::version::DocumentVersion;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;

/// Reads document version history.
#[derive(Clone)]
pub struct VersionService {
    /// Document repository.
    document_repo: Arc<DocumentRepository>,
    /// Folder repository (for tenant checks).
    folder_repo: Arc<FolderRepository>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
}

impl std::fmt::Debug for VersionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionService").finish()
    }
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        folder_repo: Arc<FolderRepository>,
        access: Arc<dyn AccessOracle>,
    ) -> Self {
        Self {
            document_repo,
            folder_repo,
            access,
        }
    }

    /// Lists all versions of a document, newest first.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Vec<DocumentVersion>> {
        self.check(ctx, document_id).await?;
        self.document_repo.find_versions(document_id).await
    }

    /// Gets the latest version of a document.
    pub async fn latest_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<DocumentVersion> {
        self.check(ctx, document_id).await?;
        self.document_repo
            .find_latest_version(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document has no versions"))
    }

    /// Gets a specific version of a document.
    pub async fn get_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        version: i32,
    ) -> AppResult<DocumentVersion> {
        self.check(ctx, document_id).await?;
        self.document_repo
            .find_version(document_id, version)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version} not found")))
    }

    async fn check(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<()> {
        let document = self
            .document_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        load_owned_folder(&self.folder_repo, ctx, document.folder_id).await?;

        self.access
            .require(
                ctx.user_id,
                AccessAction::View,
                AccessResource::Document(document_id),
            )
            .await
    }
}
