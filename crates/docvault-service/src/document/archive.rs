//! Streaming ZIP export of a folder subtree.
//!
//! The subtree is enumerated with an explicit worklist over `parent_id`
//! (no recursion, no depth limit). Entry bytes flow one document at a time
//! through a bounded channel into a blocking ZIP writer that spools to an
//! anonymous temp file, so memory stays flat no matter how large the
//! subtree is; the response then streams straight off the spool. A
//! document whose object cannot be fetched is logged and skipped — the
//! archive completes with whatever succeeded.

use std::io::{Seek, Write};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use uuid::Uuid;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};
use docvault_core::traits::storage::{ByteStream, ObjectStore};
use docvault_database::repositories::document::DocumentRepository;
use docvault_database::repositories::folder::FolderRepository;

use crate::context::RequestContext;
use crate::folder::service::load_owned_folder;

/// One file to place into the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry path inside the ZIP, relative to the archived folder.
    pub name: String,
    /// Object key to fetch the content from.
    pub object_key: String,
}

/// A ready-to-stream archive.
pub struct ArchiveResult {
    /// Suggested download filename.
    pub filename: String,
    /// The ZIP content stream.
    pub stream: ByteStream,
}

impl std::fmt::Debug for ArchiveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveResult")
            .field("filename", &self.filename)
            .finish()
    }
}

/// Builds ZIP archives of folder subtrees.
#[derive(Clone)]
pub struct ArchiveService {
    /// Folder repository.
    folder_repo: Arc<FolderRepository>,
    /// Document repository.
    document_repo: Arc<DocumentRepository>,
    /// Object store.
    store: Arc<dyn ObjectStore>,
    /// Permission oracle.
    access: Arc<dyn AccessOracle>,
}

impl std::fmt::Debug for ArchiveService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveService").finish()
    }
}

impl ArchiveService {
    /// Creates a new archive service.
    pub fn new(
        folder_repo: Arc<FolderRepository>,
        document_repo: Arc<DocumentRepository>,
        store: Arc<dyn ObjectStore>,
        access: Arc<dyn AccessOracle>,
    ) -> Self {
        Self {
            folder_repo,
            document_repo,
            store,
            access,
        }
    }

    /// Streams a folder's full recursive contents as a ZIP.
    pub async fn archive_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<ArchiveResult> {
        let root = load_owned_folder(&self.folder_repo, ctx, folder_id).await?;

        self.access
            .require(ctx.user_id, AccessAction::View, AccessResource::Folder(folder_id))
            .await?;

        // Worklist walk: collect the subtree level by level.
        let mut folder_ids = vec![root.id];
        let mut frontier = vec![root.id];
        while !frontier.is_empty() {
            let children = self.folder_repo.find_children_of(&frontier).await?;
            frontier = children.into_iter().map(|f| f.id).collect();
            folder_ids.extend(frontier.iter().copied());
        }

        let locations = self
            .document_repo
            .find_locations_in_folders(&folder_ids)
            .await?;

        if locations.is_empty() {
            return Err(AppError::validation(
                "Folder contains no documents to archive",
            ));
        }

        let entries: Vec<ArchiveEntry> = locations
            .into_iter()
            .map(|loc| ArchiveEntry {
                name: entry_name(&root.path, &loc.folder_path, &loc.file_name),
                object_key: loc.object_key,
            })
            .collect();

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            entries = entries.len(),
            "Archive export started"
        );

        let stream = stream_zip(Arc::clone(&self.store), entries).await?;

        Ok(ArchiveResult {
            filename: format!("{}.zip", root.name),
            stream,
        })
    }
}

/// Build a ZIP from the given entries and return its content stream.
///
/// Fetches entries one at a time and hands each to a blocking writer task
/// over a bounded channel; the writer spools the archive to an anonymous
/// temp file which is then streamed back. Unreadable entries are skipped
/// with a warning.
pub async fn stream_zip(
    store: Arc<dyn ObjectStore>,
    entries: Vec<ArchiveEntry>,
) -> AppResult<ByteStream> {
    let (tx, mut rx) = mpsc::channel::<(String, Bytes)>(2);

    let writer = tokio::task::spawn_blocking(move || -> AppResult<std::fs::File> {
        let file = tempfile::tempfile()?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(true);

        while let Some((name, data)) = rx.blocking_recv() {
            zip.start_file(name, options).map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to start archive entry", e)
            })?;
            zip.write_all(&data).map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write archive entry", e)
            })?;
        }

        let mut file = zip.finish().map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to finish archive", e)
        })?;
        file.rewind()?;
        Ok(file)
    });

    for entry in entries {
        match store.get_bytes(&entry.object_key).await {
            Ok(data) => {
                // A send error means the writer bailed; its error is
                // surfaced when the task is joined below.
                if tx.send((entry.name, data)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(
                    object_key = %entry.object_key,
                    error = %e,
                    "Skipping unreadable archive entry"
                );
            }
        }
    }
    drop(tx);

    let file = writer
        .await
        .map_err(|e| AppError::internal(format!("Archive writer task failed: {e}")))??;

    Ok(Box::pin(ReaderStream::new(tokio::fs::File::from_std(file))))
}

/// Compute an entry's path inside the archive: the document's folder path
/// relative to the archived root, joined with the file name.
fn entry_name(root_path: &str, folder_path: &str, file_name: &str) -> String {
    let rel = folder_path
        .strip_prefix(root_path)
        .unwrap_or(folder_path)
        .trim_start_matches('/');

    if rel.is_empty() {
        file_name.to_string()
    } else {
        format!("{rel}/{file_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_name_strips_root_prefix() {
        assert_eq!(entry_name("/B", "/B/A", "x.txt"), "A/x.txt");
        assert_eq!(entry_name("/B", "/B", "x.txt"), "x.txt");
        assert_eq!(entry_name("/B", "/B/A/C", "r.pdf"), "A/C/r.pdf");
    }
}
