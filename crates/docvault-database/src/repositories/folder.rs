//! Folder repository implementation.
//!
//! Structural mutations (rename/move) rewrite the materialized path of the
//! folder, every descendant folder, and every affected document/version
//! object key in a single transaction, guarded by per-subtree advisory
//! locks so two overlapping rewrites cannot interleave.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_entity::folder::model::{CreateFolder, Folder, OwnerType};

/// Result of a transactional subtree rewrite.
///
/// `relocations` lists every `(old_key, new_key)` object pair whose physical
/// bytes still have to be moved in storage. The metadata already points at
/// the new keys when this struct is returned.
#[derive(Debug)]
pub struct SubtreeRewrite {
    /// The folder row after the rewrite.
    pub folder: Folder,
    /// Object relocations to perform post-commit.
    pub relocations: Vec<(String, String)>,
}

/// Repository for folder CRUD, prefix queries, and subtree path rewrites.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a folder by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    /// Find a folder by owner and path.
    pub async fn find_by_path(
        &self,
        owner_id: Uuid,
        owner_type: OwnerType,
        path: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND owner_type = $2 AND path = $3",
        )
        .bind(owner_id)
        .bind(owner_type)
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find folder by path", e)
        })
    }

    /// Find a direct child (or root folder when `parent_id` is None) by name.
    ///
    /// Used for collision checks before create/rename/move.
    pub async fn find_sibling(
        &self,
        owner_id: Uuid,
        owner_type: OwnerType,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND owner_type = $2 AND parent_id IS NOT DISTINCT FROM $3 \
               AND name = $4",
        )
        .bind(owner_id)
        .bind(owner_type)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find sibling", e))
    }

    /// List root folders for an owner.
    pub async fn find_roots(&self, owner_id: Uuid, owner_type: OwnerType) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND owner_type = $2 AND parent_id IS NULL ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(owner_type)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list root folders", e))
    }

    /// List direct children of a folder.
    pub async fn find_children(
        &self,
        parent_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;

        let folders = sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC LIMIT $2 OFFSET $3",
        )
        .bind(parent_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))?;

        Ok(PageResponse::new(
            folders,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// List the direct children of a batch of folders.
    ///
    /// Backs the breadth-first subtree walks (archive export, tree
    /// listings) without unbounded recursion.
    pub async fn find_children_of(&self, parent_ids: &[Uuid]) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id = ANY($1) ORDER BY path ASC",
        )
        .bind(parent_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children batch", e))
    }

    /// Count direct subfolders.
    pub async fn count_children(&self, folder_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(folder_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;
        Ok(count as u64)
    }

    /// Create a new folder.
    pub async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, path, parent_id, owner_id, owner_type) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(data.owner_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("folders_owner_path_key")
                    || db_err.constraint() == Some("folders_parent_name_key") =>
            {
                AppError::conflict(format!("Folder path '{}' already exists", data.path))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create folder", e),
        })
    }

    /// Delete a folder row.
    ///
    /// The service layer guarantees the folder is empty; the foreign keys
    /// from `documents` and child `folders` reject anything else.
    pub async fn delete(&self, folder_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(folder_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete folder", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Rename a folder and rewrite every descendant path and object key.
    ///
    /// Runs in one transaction. `lock_ids` are the folder ids whose
    /// subtrees this operation touches; each is turned into an advisory
    /// lock so a concurrent overlapping rewrite fails with `Conflict`
    /// instead of interleaving.
    #[allow(clippy::too_many_arguments)]
    pub async fn rename_subtree(
        &self,
        folder_id: Uuid,
        lock_ids: &[Uuid],
        new_name: &str,
        old_path: &str,
        new_path: &str,
        old_key_prefix: &str,
        new_key_prefix: &str,
    ) -> AppResult<SubtreeRewrite> {
        let mut tx = self.begin().await?;
        Self::acquire_subtree_locks(&mut tx, lock_ids).await?;

        let relocations =
            Self::collect_relocations(&mut tx, old_key_prefix, new_key_prefix).await?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, path = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(folder_id)
        .bind(new_name)
        .bind(new_path)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Self::map_rewrite_error)?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        Self::cascade_rewrite(&mut tx, &folder, old_path, new_path, old_key_prefix, new_key_prefix)
            .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit rename", e))?;

        Ok(SubtreeRewrite {
            folder,
            relocations,
        })
    }

    /// Move a folder under a new parent and rewrite every descendant path
    /// and object key. Same transactional shape as [`Self::rename_subtree`].
    #[allow(clippy::too_many_arguments)]
    pub async fn move_subtree(
        &self,
        folder_id: Uuid,
        lock_ids: &[Uuid],
        new_parent_id: Uuid,
        old_path: &str,
        new_path: &str,
        old_key_prefix: &str,
        new_key_prefix: &str,
    ) -> AppResult<SubtreeRewrite> {
        let mut tx = self.begin().await?;
        Self::acquire_subtree_locks(&mut tx, lock_ids).await?;

        let relocations =
            Self::collect_relocations(&mut tx, old_key_prefix, new_key_prefix).await?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, path = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(folder_id)
        .bind(new_parent_id)
        .bind(new_path)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Self::map_rewrite_error)?
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        Self::cascade_rewrite(&mut tx, &folder, old_path, new_path, old_key_prefix, new_key_prefix)
            .await?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit move", e))?;

        Ok(SubtreeRewrite {
            folder,
            relocations,
        })
    }

    /// Recompute `file_count` and `total_size` for a folder by summing over
    /// every document whose folder lies inside the subtree.
    ///
    /// Idempotent and self-correcting: the aggregate is derived from
    /// scratch on each call, never adjusted incrementally.
    pub async fn recompute_stats(
        &self,
        folder_id: Uuid,
        owner_id: Uuid,
        owner_type: OwnerType,
        path: &str,
    ) -> AppResult<(i64, i64)> {
        let row: (i64, i64) = sqlx::query_as(
            "UPDATE folders SET file_count = agg.cnt, total_size = agg.sz, updated_at = NOW() \
             FROM ( \
                 SELECT COUNT(d.id) AS cnt, COALESCE(SUM(d.size), 0)::BIGINT AS sz \
                 FROM documents d \
                 JOIN folders sub ON sub.id = d.folder_id \
                 WHERE sub.owner_id = $2 AND sub.owner_type = $3 \
                   AND (sub.path = $4 OR sub.path LIKE $4 || '/%') \
             ) AS agg \
             WHERE folders.id = $1 \
             RETURNING folders.file_count, folders.total_size",
        )
        .bind(folder_id)
        .bind(owner_id)
        .bind(owner_type)
        .bind(path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to recompute stats", e))?;

        Ok(row)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to open transaction", e))
    }

    /// Take transaction-scoped advisory locks for every subtree involved.
    ///
    /// `pg_try_advisory_xact_lock` is non-blocking; a held lock means a
    /// concurrent structural operation is mid-flight and this one gives up.
    async fn acquire_subtree_locks(
        tx: &mut Transaction<'_, Postgres>,
        lock_ids: &[Uuid],
    ) -> AppResult<()> {
        for id in lock_ids {
            let locked: bool = sqlx::query_scalar(
                "SELECT pg_try_advisory_xact_lock(hashtextextended($1, 0))",
            )
            .bind(id.to_string())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to take subtree lock", e)
            })?;

            if !locked {
                return Err(AppError::conflict(
                    "Another structural operation is in progress on this subtree",
                ));
            }
        }
        Ok(())
    }

    /// Collect the `(old_key, new_key)` relocation pairs for every version
    /// object inside the subtree.
    ///
    /// Object keys embed the owner tuple and folder path, so the key prefix
    /// alone identifies the subtree. Version keys are a superset of document
    /// keys (each document's key equals its latest version's key), so
    /// versions alone cover every physical object.
    async fn collect_relocations(
        tx: &mut Transaction<'_, Postgres>,
        old_key_prefix: &str,
        new_key_prefix: &str,
    ) -> AppResult<Vec<(String, String)>> {
        let old_keys: Vec<String> = sqlx::query_scalar(
            "SELECT object_key FROM document_versions \
             WHERE object_key LIKE $1 || '/%' ORDER BY object_key ASC",
        )
        .bind(old_key_prefix)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to collect relocations", e)
        })?;

        Ok(old_keys
            .into_iter()
            .filter_map(|old| {
                old.strip_prefix(old_key_prefix)
                    .map(|suffix| (old.clone(), format!("{new_key_prefix}{suffix}")))
            })
            .collect())
    }

    /// Rewrite descendant folder paths and document/version object keys by
    /// prefix substitution. The folder's own row is already updated.
    async fn cascade_rewrite(
        tx: &mut Transaction<'_, Postgres>,
        folder: &Folder,
        old_path: &str,
        new_path: &str,
        old_key_prefix: &str,
        new_key_prefix: &str,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE folders \
             SET path = $2 || substring(path FROM char_length($1) + 1), updated_at = NOW() \
             WHERE owner_id = $3 AND owner_type = $4 AND path LIKE $1 || '/%'",
        )
        .bind(old_path)
        .bind(new_path)
        .bind(folder.owner_id)
        .bind(folder.owner_type)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rewrite descendant paths", e)
        })?;

        sqlx::query(
            "UPDATE documents \
             SET object_key = $2 || substring(object_key FROM char_length($1) + 1), \
                 updated_at = NOW() \
             WHERE object_key LIKE $1 || '/%'",
        )
        .bind(old_key_prefix)
        .bind(new_key_prefix)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rewrite document keys", e)
        })?;

        sqlx::query(
            "UPDATE document_versions \
             SET object_key = $2 || substring(object_key FROM char_length($1) + 1) \
             WHERE object_key LIKE $1 || '/%'",
        )
        .bind(old_key_prefix)
        .bind(new_key_prefix)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to rewrite version keys", e)
        })?;

        Ok(())
    }

    fn map_rewrite_error(e: sqlx::Error) -> AppError {
        match &e {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some("folders_owner_path_key")
                    || db_err.constraint() == Some("folders_parent_name_key") =>
            {
                AppError::conflict("A folder with that name already exists at the target location")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to rewrite folder", e),
        }
    }
}
