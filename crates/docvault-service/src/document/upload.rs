//! Document upload — first version and subsequent versions.
//!
//! The object is written to storage before the metadata transaction. If
//! the metadata step then fails, the freshly-written object is deleted
//! again (compensating delete) so a failed upload leaks nothing.

use std::sync::Arc;

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use docvault_core::config::storage::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::events::DomainEvent;
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_core::traits::storage::ObjectStore;
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;
use docvault_entity::document::model::{CreateDocument, Document};
use docvault_entity::document::version::DocumentVersion;
use docvault_entity::folder::model::Folder;
use docvault_storage::keys;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;
use crate::folder::stats::StatsService;
use crate::naming;
use crate::notify::EventDispatcher;

/// Parameters for an upload into a folder.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target folder ID.
    pub folder_id: Uuid,
    /// File name.
    pub file_name: String,
    /// MIME type, if the client supplied one.
    pub mime_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// Handles document uploads and version creation.
#[derive(Clone)]
pub struct UploadService {
    /// Document repository.
    document_repo: Arc<DocumentRepository>,
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Object store.
    store: Arc<dyn ObjectStore>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
    /// Stats aggregator.
    stats: Arc<StatsService>,
    /// Event dispatcher.
    events: EventDispatcher,
    /// Storage configuration (upload limits).
    config: StorageConfig,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        folder_repo: Arc<FolderRepository>,
        store: Arc<dyn ObjectStore>,
        access: Arc<dyn AccessOracle>,
        stats: Arc<StatsService>,
        events: EventDispatcher,
        config: StorageConfig,
    ) -> Self {
        Self {
            document_repo,
            folder_repo,
            store,
            access,
            stats,
            events,
            config,
        }
    }

    /// Uploads content into a folder.
    ///
    /// If no document with the given file name exists there, this creates
    /// a new document at version 1; otherwise it becomes the next version
    /// of the existing document.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        params: UploadParams,
    ) -> AppResult<(Document, DocumentVersion)> {
        naming::validate_name(&params.file_name)?;
        self.check_payload(&params.data)?;

        let folder = load_owned_folder(&self.folder_repo, ctx, params.folder_id).await?;

        self.access
            .require(
                ctx.user_id,
                AccessAction::Edit,
                AccessResource::Folder(params.folder_id),
            )
            .await?;

        let existing = self
            .document_repo
            .find_by_folder_and_name(params.folder_id, &params.file_name)
            .await?;

        match existing {
            None => self.store_first_version(ctx, &folder, params).await,
            Some(document) => {
                self.store_next_version(ctx, &folder, document, params.mime_type, params.data)
                    .await
            }
        }
    }

    /// Uploads a new version of an existing document.
    pub async fn upload_version(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        mime_type: Option<String>,
        data: Bytes,
    ) -> AppResult<(Document, DocumentVersion)> {
        self.check_payload(&data)?;

        let document = self
            .document_repo
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        let folder = load_owned_folder(&self.folder_repo, ctx, document.folder_id).await?;

        self.access
            .require(
                ctx.user_id,
                AccessAction::Edit,
                AccessResource::Document(document_id),
            )
            .await?;

        self.store_next_version(ctx, &folder, document, mime_type, data)
            .await
    }

    async fn store_first_version(
        &self,
        ctx: &RequestContext,
        folder: &Folder,
        params: UploadParams,
    ) -> AppResult<(Document, DocumentVersion)> {
        let checksum = sha256_hex(&params.data);
        let size = params.data.len() as i64;

        let document_id = Uuid::new_v4();
        let folder_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &folder.path);
        let document_prefix = keys::document_prefix(&folder_prefix, document_id);
        let object_key = keys::version_key(&document_prefix, 1, &params.file_name);

        self.store.put(&object_key, params.data).await?;

        let created = self
            .document_repo
            .create_with_version(&CreateDocument {
                id: document_id,
                folder_id: folder.id,
                file_name: params.file_name.clone(),
                original_name: params.file_name,
                object_key: object_key.clone(),
                checksum,
                size,
                mime_type: params.mime_type,
                created_by: ctx.user_id,
            })
            .await;

        let (document, version) = match created {
            Ok(pair) => pair,
            Err(e) => {
                self.compensate(&object_key).await;
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id,
            document_id = %document.id,
            file_name = %document.file_name,
            size,
            "Document uploaded"
        );

        self.events.dispatch(DomainEvent::DocumentUploaded {
            document_id: document.id,
            folder_id: folder.id,
            version: version.version,
            size,
            actor: ctx.user_id,
        });

        self.stats.refresh(folder.id).await;

        Ok((document, version))
    }

    async fn store_next_version(
        &self,
        ctx: &RequestContext,
        folder: &Folder,
        document: Document,
        mime_type: Option<String>,
        data: Bytes,
    ) -> AppResult<(Document, DocumentVersion)> {
        let checksum = sha256_hex(&data);
        let size = data.len() as i64;
        let next_version = document.current_version + 1;

        let folder_prefix = keys::folder_prefix(folder.owner_type, folder.owner_id, &folder.path);
        let document_prefix = keys::document_prefix(&folder_prefix, document.id);
        let object_key = keys::version_key(&document_prefix, next_version, &document.file_name);

        self.store.put(&object_key, data).await?;

        let created = self
            .document_repo
            .add_version(
                document.id,
                next_version,
                &object_key,
                &checksum,
                size,
                mime_type.as_deref(),
                ctx.user_id,
            )
            .await;

        let (document, version) = match created {
            Ok(pair) => pair,
            Err(e) => {
                self.compensate(&object_key).await;
                return Err(e);
            }
        };

        info!(
            user_id = %ctx.user_id,
            document_id = %document.id,
            version = version.version,
            size,
            "Document version uploaded"
        );

        self.events.dispatch(DomainEvent::DocumentUploaded {
            document_id: document.id,
            folder_id: folder.id,
            version: version.version,
            size,
            actor: ctx.user_id,
        });

        self.stats.refresh(folder.id).await;

        Ok((document, version))
    }

    fn check_payload(&self, data: &Bytes) -> AppResult<()> {
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }
        Ok(())
    }

    /// Remove an object written ahead of a metadata step that then failed.
    async fn compensate(&self, object_key: &str) {
        if let Err(e) = self.store.delete(object_key).await {
            warn!(
                object_key,
                error = %e,
                "Failed to remove orphaned object after metadata failure"
            );
        }
    }
}

/// SHA-256 of the full content, as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
