//! Default binding for the external permission oracle.

use async_trait::async_trait;
use uuid::Uuid;

use docvault_core::result::AppResult;
use docvault_core::traits::access::{AccessAction, AccessOracle, AccessResource};

/// Oracle that permits every action.
///
/// Authorization is decided by the platform around DocVault; deployments
/// that embed a real oracle swap this out at wiring time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAllOracle;

#[async_trait]
impl AccessOracle for PermitAllOracle {
    async fn require(
        &self,
        _user_id: Uuid,
        _action: AccessAction,
        _resource: AccessResource,
    ) -> AppResult<()> {
        Ok(())
    }
}
