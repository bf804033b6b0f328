//! In-memory object store for tests and single-process deployments.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{ByteStream, ObjectStore};

/// Object store holding everything in process memory.
///
/// A `BTreeMap` keeps keys ordered, which makes prefix listing a range
/// scan and gives tests deterministic output.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let data = self.get_bytes(key).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn get_bytes(&self, key: &str) -> AppResult<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> AppResult<()> {
        let mut objects = self.objects.write().await;
        let data = objects
            .get(src_key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {src_key}")))?;
        objects.insert(dst_key.to_string(), data);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn list_by_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_copy_delete() {
        let store = MemoryObjectStore::new();
        assert!(store.is_empty().await);

        store.put("a/1", Bytes::from("one")).await.unwrap();
        store.copy("a/1", "b/1").await.unwrap();
        assert_eq!(store.len().await, 2);

        assert_eq!(store.get_bytes("b/1").await.unwrap(), Bytes::from("one"));

        store.delete("a/1").await.unwrap();
        assert!(!store.exists("a/1").await.unwrap());
        assert!(store.exists("b/1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_by_prefix_is_ordered() {
        let store = MemoryObjectStore::new();
        store.put("p/2", Bytes::new()).await.unwrap();
        store.put("p/1", Bytes::new()).await.unwrap();
        store.put("q/1", Bytes::new()).await.unwrap();

        let keys = store.list_by_prefix("p/").await.unwrap();
        assert_eq!(keys, vec!["p/1".to_string(), "p/2".to_string()]);
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let store = MemoryObjectStore::new();
        assert!(store.copy("nope", "dst").await.is_err());
    }
}
