//! Document download — streams content for the latest or a specific version.

use std::sync::Arc;

use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_core::traits::storage::{ByteStream, ObjectStore};
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::document::model::Document;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;

/// A download: metadata plus the content stream.
pub struct DownloadResult {
    /// Document metadata.
    pub document: Document,
    /// Content byte stream.
    pub stream: ByteStream,
    /// MIME type for the Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
    /// Content length in bytes.
    pub size: i64,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("document", &self.document.id)
            .field("filename", &self.filename)
            .field("size", &self.size)
            .finish()
    }
}

/// Handles document downloads.
#[derive(Clone)]
pub struct DownloadService {
    /// Document repository.
    document_repo: Arc<DocumentRepository>,
    /// Folder repository (for tenant checks).
    folder_repo: Arc<FolderRepository>,
    /// Object store.
    store: Arc<dyn ObjectStore>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
}

impl std::fmt::Debug for DownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadService").finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        folder_repo: Arc<FolderRepository>,
        store: Arc<dyn ObjectStore>,
        access: Arc<dyn AccessOracle>,
    ) -> Self {
        Self {
            document_repo,
            folder_repo,
            store,
            access,
        }
    }

    /// Streams the latest version of a document.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<DownloadResult> {
        let document = self.check(ctx, document_id).await?;

        let stream = self.store.get(&document.object_key).await?;

        Ok(DownloadResult {
            content_type: content_type_of(&document),
            filename: document.file_name.clone(),
            size: document.size,
            stream,
            document,
        })
    }

    /// Streams a specific version of a document.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        version: i32,
    ) -> AppResult<DownloadResult> {
        let document = self.check(ctx, document_id).await?;

        let version_row = self
            .document_repo
            .find_version(document_id, version)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {version} not found")))?;

        let stream = self.store.get(&version_row.object_key).await?;

        Ok(DownloadResult {
            content_type: content_type_of(&document),
            filename: document.file_name.clone(),
            size: version_row.size,
            stream,
            document,
        })
    }

    async fn check(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Document> {
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
            .await?;

        Ok(document)
    }
}

fn content_type_of(document: &Document) -> String {
    document
        .mime_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string())
}
