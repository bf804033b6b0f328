//! Identity extractor.
//!
//! DocVault runs behind a gateway that authenticates the caller and
//! forwards the identity as trusted headers. This extractor turns them
//! into a [`RequestContext`]; requests missing the headers are rejected
//! before any handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use docvault_core::error::AppError;
use docvault_entity::folder::model::OwnerType;
use docvault_service::context::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the addressed tenant's id.
pub const OWNER_ID_HEADER: &str = "x-owner-id";
/// Header carrying the addressed tenant's kind (`user` | `organization`).
pub const OWNER_TYPE_HEADER: &str = "x-owner-type";

/// Extractor producing the request's [`RequestContext`].
#[derive(Debug, Clone)]
pub struct Identity(pub RequestContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_uuid(parts, USER_ID_HEADER)?;
        let owner_id = header_uuid(parts, OWNER_ID_HEADER)?;

        let owner_type: OwnerType = header_str(parts, OWNER_TYPE_HEADER)?
            .parse()
            .map_err(ApiError::from)?;

        Ok(Identity(RequestContext::new(user_id, owner_id, owner_type)))
    }
}

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(AppError::validation(format!("Missing {name} header"))))
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ApiError> {
    header_str(parts, name)?
        .parse::<Uuid>()
        .map_err(|_| ApiError(AppError::validation(format!("Invalid {name} header"))))
}
