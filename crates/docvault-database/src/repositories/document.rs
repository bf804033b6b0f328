//! Document repository implementation.
//!
//! Version allocation happens under a `SELECT ... FOR UPDATE` on the
//! document row, inside the same transaction that inserts the version row
//! and refreshes the denormalized latest-version fields. Version numbers
//! are therefore gap-free and strictly increasing per document.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::document::model::{CreateDocument, Document, DocumentLocation};
use docvault_entity::document::version::DocumentVersion;

/// Repository for document and document-version operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a document by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find document", e))
    }

    /// List documents in a folder with pagination.
    pub async fn find_by_folder(
        &self,
        folder_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
            })?;

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1 ORDER BY file_name ASC \
             LIMIT $2 OFFSET $3",
        )
        .bind(folder_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list documents", e))?;

        Ok(PageResponse::new(
            documents,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Find a document by folder ID and file name (for duplicate checking
    /// and for routing an upload to an existing document).
    pub async fn find_by_folder_and_name(
        &self,
        folder_id: Uuid,
        file_name: &str,
    ) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1 AND file_name = $2",
        )
        .bind(folder_id)
        .bind(file_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find document by name", e)
        })
    }

    /// Count documents directly inside a folder.
    pub async fn count_in_folder(&self, folder_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count documents", e)
            })?;
        Ok(count as u64)
    }

    /// List every document owned by the given folders, joined with each
    /// folder's materialized path. Backs archive export, where the folder
    /// set comes from a worklist walk over `parent_id`.
    pub async fn find_locations_in_folders(
        &self,
        folder_ids: &[Uuid],
    ) -> AppResult<Vec<DocumentLocation>> {
        sqlx::query_as::<_, DocumentLocation>(
            "SELECT d.id, d.file_name, d.object_key, d.size, f.path AS folder_path \
             FROM documents d \
             JOIN folders f ON f.id = d.folder_id \
             WHERE d.folder_id = ANY($1) \
             ORDER BY f.path ASC, d.file_name ASC",
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list documents in folders", e)
        })
    }

    /// Create a new document together with its version-1 row.
    pub async fn create_with_version(
        &self,
        data: &CreateDocument,
    ) -> AppResult<(Document, DocumentVersion)> {
        let mut tx = self.begin().await?;

        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents \
             (id, folder_id, file_name, original_name, object_key, checksum, size, mime_type, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.id)
        .bind(data.folder_id)
        .bind(&data.file_name)
        .bind(&data.original_name)
        .bind(&data.object_key)
        .bind(&data.checksum)
        .bind(data.size)
        .bind(&data.mime_type)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("documents_folder_id_file_name_key") =>
            {
                AppError::conflict(format!(
                    "A document named '{}' already exists in this folder",
                    data.file_name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create document", e),
        })?;

        let version = Self::insert_version(
            &mut tx,
            document.id,
            1,
            &data.object_key,
            &data.checksum,
            data.size,
            data.created_by,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit document create", e)
        })?;

        Ok((document, version))
    }

    /// Append a new version to an existing document and refresh the
    /// denormalized latest-version fields.
    ///
    /// The caller computed `version` (and the object key embedding it)
    /// before writing the object. The document row is locked and the
    /// expectation re-checked: if another upload got there first the
    /// version number no longer lines up and the call fails with
    /// `Conflict` so the caller can clean up its orphaned object.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_version(
        &self,
        document_id: Uuid,
        version: i32,
        object_key: &str,
        checksum: &str,
        size: i64,
        mime_type: Option<&str>,
        created_by: Uuid,
    ) -> AppResult<(Document, DocumentVersion)> {
        let mut tx = self.begin().await?;

        let current: Document =
            sqlx::query_as("SELECT * FROM documents WHERE id = $1 FOR UPDATE")
                .bind(document_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to lock document", e)
                })?
                .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

        if current.current_version + 1 != version {
            return Err(AppError::conflict(format!(
                "Version {version} is no longer next for this document; a concurrent upload won"
            )));
        }

        let version_row = Self::insert_version(
            &mut tx,
            document_id,
            version,
            object_key,
            checksum,
            size,
            created_by,
        )
        .await?;

        let document = sqlx::query_as::<_, Document>(
            "UPDATE documents SET object_key = $2, checksum = $3, size = $4, \
             mime_type = COALESCE($5, mime_type), current_version = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(document_id)
        .bind(object_key)
        .bind(checksum)
        .bind(size)
        .bind(mime_type)
        .bind(version)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update latest version", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit version create", e)
        })?;

        Ok((document, version_row))
    }

    /// Rename a document.
    pub async fn rename(&self, document_id: Uuid, new_name: &str) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET file_name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(document_id)
        .bind(new_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("documents_folder_id_file_name_key") =>
            {
                AppError::conflict(format!(
                    "A document named '{new_name}' already exists in this folder"
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to rename document", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// Move a document to a different folder, rewriting its object keys by
    /// prefix substitution. Returns the updated document and the
    /// `(old_key, new_key)` pairs to relocate in storage post-commit.
    pub async fn move_document(
        &self,
        document_id: Uuid,
        new_folder_id: Uuid,
        old_key_prefix: &str,
        new_key_prefix: &str,
    ) -> AppResult<(Document, Vec<(String, String)>)> {
        let mut tx = self.begin().await?;

        let old_keys: Vec<String> = sqlx::query_scalar(
            "SELECT object_key FROM document_versions WHERE document_id = $1 \
             ORDER BY version ASC",
        )
        .bind(document_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list version keys", e)
        })?;

        let relocations: Vec<(String, String)> = old_keys
            .into_iter()
            .filter_map(|old| {
                old.strip_prefix(old_key_prefix)
                    .map(|suffix| (old.clone(), format!("{new_key_prefix}{suffix}")))
            })
            .collect();

        let document = sqlx::query_as::<_, Document>(
            "UPDATE documents \
             SET folder_id = $2, \
                 object_key = $3 || substring(object_key FROM char_length($4) + 1), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(document_id)
        .bind(new_folder_id)
        .bind(new_key_prefix)
        .bind(old_key_prefix)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("documents_folder_id_file_name_key") =>
            {
                AppError::conflict(
                    "A document with that name already exists in the target folder",
                )
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to move document", e),
        })?
        .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

        sqlx::query(
            "UPDATE document_versions \
             SET object_key = $2 || substring(object_key FROM char_length($3) + 1) \
             WHERE document_id = $1",
        )
        .bind(document_id)
        .bind(new_key_prefix)
        .bind(old_key_prefix)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rewrite version keys", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit document move", e)
        })?;

        Ok((document, relocations))
    }

    /// Delete a document and all its version rows.
    pub async fn delete_with_versions(&self, document_id: Uuid) -> AppResult<bool> {
        let mut tx = self.begin().await?;

        sqlx::query("DELETE FROM document_versions WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete versions", e)
            })?;

        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete document", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit document delete", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    // -- Versions --

    /// List all versions of a document, newest first.
    pub async fn find_versions(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 ORDER BY version DESC",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    /// Find a specific version of a document.
    pub async fn find_version(
        &self,
        document_id: Uuid,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 AND version = $2",
        )
        .bind(document_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    /// Find the latest version of a document.
    pub async fn find_latest_version(
        &self,
        document_id: Uuid,
    ) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE document_id = $1 \
             ORDER BY version DESC LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find latest version", e)
        })
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open transaction", e))
    }

    async fn insert_version(
        tx: &mut Transaction<'_, Postgres>,
        document_id: Uuid,
        version: i32,
        object_key: &str,
        checksum: &str,
        size: i64,
        created_by: Uuid,
    ) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions \
             (document_id, version, object_key, checksum, size, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(document_id)
        .bind(version)
        .bind(object_key)
        .bind(checksum)
        .bind(size)
        .bind(created_by)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert version", e))
    }
}
