//! Permission oracle trait.
//!
//! DocVault does not make authorization decisions; the surrounding platform
//! does. Services consult the oracle before every mutation and read, and the
//! oracle either permits the call or fails it.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// The action a caller wants to perform on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessAction {
    /// Read metadata or content.
    View,
    /// Create, modify, or relocate.
    Edit,
    /// Remove entirely.
    Delete,
}

/// The resource an access check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResource {
    /// A folder, by ID.
    Folder(Uuid),
    /// A document, by ID.
    Document(Uuid),
}

/// External permission oracle.
///
/// Implementations are expected to return an authorization error (mapped
/// into [`crate::AppError`]) when the caller is not allowed to act.
#[async_trait]
pub trait AccessOracle: Send + Sync + std::fmt::Debug + 'static {
    /// Check that `user_id` may perform `action` on `resource`.
    async fn require(
        &self,
        user_id: Uuid,
        action: AccessAction,
        resource: AccessResource,
    ) -> AppResult<()>;
}
