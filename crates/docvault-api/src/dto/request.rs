//! Request body shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /api/folders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Parent folder ID; omit for a root folder.
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
}

/// PUT /api/folders/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameFolderRequest {
    /// The new folder name.
    pub name: String,
}

/// PUT /api/folders/{id}/move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveFolderRequest {
    /// The new parent folder ID.
    pub new_parent_id: Uuid,
}

/// PUT /api/documents/{id}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameDocumentRequest {
    /// The new file name.
    pub name: String,
}

/// PUT /api/documents/{id}/move
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveDocumentRequest {
    /// Target folder ID.
    pub target_folder_id: Uuid,
}

/// POST /api/documents/{id}/copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyDocumentRequest {
    /// Target folder ID.
    pub target_folder_id: Uuid,
}
