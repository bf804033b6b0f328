//! HTTP handlers.

pub mod document;
pub mod folder;
pub mod health;
pub mod maintenance;

use docvault_core::error::AppError;
use docvault_service::sweep::RelocationStatus;

use crate::error::ApiError;

/// Turn a partial relocation into the error the caller must see.
///
/// The metadata transaction already committed; this does not undo it. It
/// reports honestly that storage lags behind until the sweep catches up.
pub(crate) fn require_relocated(relocation: RelocationStatus) -> Result<(), ApiError> {
    match relocation {
        RelocationStatus::Complete => Ok(()),
        RelocationStatus::Partial { failed } => Err(ApiError(AppError::storage_unavailable(
            format!(
                "Metadata updated, but {failed} objects could not be relocated; \
                 repair has been queued"
            ),
        ))),
    }
}
