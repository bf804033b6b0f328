//! Request context carrying the gateway-forwarded identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::folder::model::{Folder, OwnerType};

/// Context for the current request.
///
/// The gateway in front of DocVault authenticates the caller and forwards
/// the user id plus the owner tuple (the tenant whose folder tree is being
/// addressed) as trusted headers. Services check that every touched folder
/// belongs to that tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The tenant that owns the addressed folder tree.
    pub owner_id: Uuid,
    /// Whether the tenant is a user or an organization.
    pub owner_type: OwnerType,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, owner_id: Uuid, owner_type: OwnerType) -> Self {
        Self {
            user_id,
            owner_id,
            owner_type,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the given folder belongs to this request's tenant.
    pub fn owns(&self, folder: &Folder) -> bool {
        folder.owner_id == self.owner_id && folder.owner_type == self.owner_type
    }
}
