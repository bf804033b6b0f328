//! Folder entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The kind of tenant a folder tree belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "owner_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    /// A personal folder tree.
    User,
    /// An organization-wide folder tree.
    Organization,
}

impl OwnerType {
    /// Return the owner type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = docvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "organization" => Ok(Self::Organization),
            _ => Err(docvault_core::AppError::validation(format!(
                "Invalid owner type: '{s}'. Expected one of: user, organization"
            ))),
        }
    }
}

/// A folder in the document hierarchy.
///
/// Hierarchy is encoded twice: `parent_id` is the authoritative tree edge,
/// and `path` is the materialized location used for prefix queries. Both
/// are kept in sync by the path propagation cascade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Full materialized path (e.g., `/projects/reports`).
    pub path: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<Uuid>,
    /// The tenant that owns this folder tree.
    pub owner_id: Uuid,
    /// Whether the owner is a user or an organization.
    pub owner_type: OwnerType,
    /// Denormalized count of documents in this folder and its subtree.
    pub file_count: i64,
    /// Denormalized total size in bytes of documents in this folder and its subtree.
    pub total_size: i64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this folder shares its owner tuple with another folder.
    pub fn same_owner(&self, other: &Folder) -> bool {
        self.owner_id == other.owner_id && self.owner_type == other.owner_type
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
    /// The owning tenant.
    pub owner_id: Uuid,
    /// Whether the owner is a user or an organization.
    pub owner_type: OwnerType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_type_from_str() {
        assert_eq!("user".parse::<OwnerType>().unwrap(), OwnerType::User);
        assert_eq!(
            "ORGANIZATION".parse::<OwnerType>().unwrap(),
            OwnerType::Organization
        );
        assert!("team".parse::<OwnerType>().is_err());
    }
}
