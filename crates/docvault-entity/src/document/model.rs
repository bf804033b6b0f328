//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A versioned document stored in DocVault.
///
/// `object_key`, `checksum`, `size`, and `current_version` are denormalized
/// from the latest [`super::DocumentVersion`] so reads never need a join.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// The folder containing this document.
    pub folder_id: Uuid,
    /// The current file name (may differ from the uploaded name after rename).
    pub file_name: String,
    /// The file name as originally uploaded.
    pub original_name: String,
    /// Object-storage key of the latest version's content.
    pub object_key: String,
    /// SHA-256 checksum (lowercase hex) of the latest version.
    pub checksum: String,
    /// Size in bytes of the latest version.
    pub size: i64,
    /// MIME type of the content, if known.
    pub mime_type: Option<String>,
    /// The latest version number.
    pub current_version: i32,
    /// The user who first uploaded the document.
    pub created_by: Uuid,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.file_name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new document record.
///
/// The id is allocated by the caller, not the database: the version-1
/// object key embeds it, and the object is written before this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Pre-allocated document identifier.
    pub id: Uuid,
    /// The folder to place the document in.
    pub folder_id: Uuid,
    /// The file name.
    pub file_name: String,
    /// The original upload name.
    pub original_name: String,
    /// Object key of the version-1 content.
    pub object_key: String,
    /// SHA-256 checksum (lowercase hex).
    pub checksum: String,
    /// Size in bytes.
    pub size: i64,
    /// MIME type, if known.
    pub mime_type: Option<String>,
    /// The uploading user.
    pub created_by: Uuid,
}

/// A document joined with its folder's materialized path.
///
/// Used by subtree-wide reads (archive export, stats) that need to place a
/// document relative to a folder tree without fetching each folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentLocation {
    /// The document ID.
    pub id: Uuid,
    /// The current file name.
    pub file_name: String,
    /// Object key of the latest version.
    pub object_key: String,
    /// Size in bytes of the latest version.
    pub size: i64,
    /// Materialized path of the owning folder.
    pub folder_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(name: &str) -> Document {
        Document {
            id: Uuid::new_v4(),
            folder_id: Uuid::new_v4(),
            file_name: name.to_string(),
            original_name: name.to_string(),
            object_key: String::new(),
            checksum: String::new(),
            size: 0,
            mime_type: None,
            current_version: 1,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_extension() {
        assert_eq!(doc("report.PDF").extension(), Some("pdf".to_string()));
        assert_eq!(doc("archive.tar.gz").extension(), Some("gz".to_string()));
        assert_eq!(doc("README").extension(), None);
    }
}
