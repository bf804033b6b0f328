//! # docvault-storage
//!
//! Object store backends for DocVault. The [`ObjectStore`] trait itself is
//! defined in `docvault-core`; this crate provides the local-filesystem and
//! in-memory implementations plus the object-key construction helpers that
//! tie storage locations to folder paths.

use std::sync::Arc;

use docvault_core::config::storage::StorageConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::ObjectStore;

pub mod keys;
pub mod providers;

pub use providers::local::LocalObjectStore;
pub use providers::memory::MemoryObjectStore;

/// Build the configured object store backend.
pub async fn build_store(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStore>> {
    match config.provider.as_str() {
        "local" => {
            let store = LocalObjectStore::new(&config.local.root_path).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryObjectStore::new())),
        other => Err(AppError::configuration(format!(
            "Unknown storage provider '{other}'. Expected one of: local, memory"
        ))),
    }
}
