//! Domain events emitted after successful mutations.
//!
//! Events are dispatched to the configured [`crate::traits::notify::EventSink`]
//! on detached tasks; consumers (websocket fan-out, email digests, audit
//! trails) live outside this system.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to folder and document operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A folder was created.
    FolderCreated {
        /// The folder ID.
        folder_id: Uuid,
        /// The materialized path.
        path: String,
        /// The acting user.
        actor: Uuid,
    },
    /// A folder was renamed.
    FolderRenamed {
        /// The folder ID.
        folder_id: Uuid,
        /// The path before the rename.
        old_path: String,
        /// The path after the rename.
        new_path: String,
        /// The acting user.
        actor: Uuid,
    },
    /// A folder was moved under a new parent.
    FolderMoved {
        /// The folder ID.
        folder_id: Uuid,
        /// The path before the move.
        old_path: String,
        /// The path after the move.
        new_path: String,
        /// The acting user.
        actor: Uuid,
    },
    /// A folder was deleted.
    FolderDeleted {
        /// The folder ID.
        folder_id: Uuid,
        /// The path at deletion time (for display afterwards).
        path: String,
        /// The acting user.
        actor: Uuid,
    },
    /// A document version was stored (covers both first upload and
    /// subsequent versions).
    DocumentUploaded {
        /// The document ID.
        document_id: Uuid,
        /// The folder containing the document.
        folder_id: Uuid,
        /// The version number that was written.
        version: i32,
        /// Size of the uploaded content in bytes.
        size: i64,
        /// The acting user.
        actor: Uuid,
    },
    /// A document was moved to a different folder.
    DocumentMoved {
        /// The document ID.
        document_id: Uuid,
        /// The source folder.
        from_folder_id: Uuid,
        /// The destination folder.
        to_folder_id: Uuid,
        /// The acting user.
        actor: Uuid,
    },
    /// A document was copied.
    DocumentCopied {
        /// The original document ID.
        source_document_id: Uuid,
        /// The new copy's document ID.
        new_document_id: Uuid,
        /// The destination folder.
        to_folder_id: Uuid,
        /// The acting user.
        actor: Uuid,
    },
    /// A document and its full version history were deleted.
    DocumentDeleted {
        /// The document ID.
        document_id: Uuid,
        /// The file name (for display after deletion).
        file_name: String,
        /// The folder it was in.
        folder_id: Uuid,
        /// The acting user.
        actor: Uuid,
    },
}
