//! Object store trait for pluggable blob storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends, scoped to a single bucket.
///
/// Keys are `/`-separated relative paths with no leading slash. The store
/// is flat: "directories" exist only as key prefixes, which is why bulk
/// operations are expressed in terms of [`list_by_prefix`].
///
/// [`list_by_prefix`]: ObjectStore::list_by_prefix
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write an object, overwriting any existing object at the key.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read an object as a byte stream. Fails with `NotFound` if absent.
    async fn get(&self, key: &str) -> AppResult<ByteStream>;

    /// Read an object fully into memory. Fails with `NotFound` if absent.
    async fn get_bytes(&self, key: &str) -> AppResult<Bytes>;

    /// Delete an object. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Copy an object to a new key within the bucket.
    async fn copy(&self, src_key: &str, dst_key: &str) -> AppResult<()>;

    /// Check whether an object exists at the given key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// List all object keys starting with the given prefix.
    async fn list_by_prefix(&self, prefix: &str) -> AppResult<Vec<String>>;
}
