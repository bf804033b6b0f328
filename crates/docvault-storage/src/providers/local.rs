//! Local filesystem object store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::storage::{ByteStream, ObjectStore};

/// Object store backed by a local directory tree.
///
/// Keys map directly to relative file paths under the root; prefix listing
/// walks the directory tree with an explicit stack.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a new local object store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(key);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write object: {key}"),
                e,
            )
        })?;

        debug!(key, bytes = data.len(), "Wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(key);
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open object: {key}"),
                    e,
                )
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    async fn get_bytes(&self, key: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(key);
        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read object: {key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete object: {key}"),
                    e,
                )
            })?;
        }
        Ok(())
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> AppResult<()> {
        let from_path = self.resolve(src_key);
        let to_path = self.resolve(dst_key);
        self.ensure_parent(&to_path).await?;

        fs::copy(&from_path, &to_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {src_key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to copy {src_key} -> {dst_key}"),
                    e,
                )
            }
        })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.resolve(key).exists())
    }

    async fn list_by_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        format!("Failed to list directory: {}", dir.display()),
                        e,
                    ));
                }
            };

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
            })? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to get entry type", e)
                })?;

                if file_type.is_dir() {
                    stack.push(path);
                } else if let Ok(rel) = path.strip_prefix(&self.root) {
                    let key = rel.to_string_lossy().replace('\\', "/");
                    if key.starts_with(prefix) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let data = Bytes::from("hello world");
        store.put("a/b/file.txt", data.clone()).await.unwrap();

        assert!(store.exists("a/b/file.txt").await.unwrap());

        let read_back = store.get_bytes("a/b/file.txt").await.unwrap();
        assert_eq!(read_back, data);

        store.delete("a/b/file.txt").await.unwrap();
        assert!(!store.exists("a/b/file.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.delete("never/existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        let err = store.get_bytes("missing.bin").await.unwrap_err();
        assert_eq!(err.kind, docvault_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_copy() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.put("orig.txt", Bytes::from("content")).await.unwrap();
        store.copy("orig.txt", "nested/copy.txt").await.unwrap();

        assert!(store.exists("orig.txt").await.unwrap());
        assert_eq!(
            store.get_bytes("nested/copy.txt").await.unwrap(),
            Bytes::from("content")
        );
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_str().unwrap())
            .await
            .unwrap();

        store.put("x/a/1.txt", Bytes::from("1")).await.unwrap();
        store.put("x/a/2.txt", Bytes::from("2")).await.unwrap();
        store.put("x/b/3.txt", Bytes::from("3")).await.unwrap();

        let keys = store.list_by_prefix("x/a/").await.unwrap();
        assert_eq!(keys, vec!["x/a/1.txt".to_string(), "x/a/2.txt".to_string()]);

        let all = store.list_by_prefix("x/").await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
