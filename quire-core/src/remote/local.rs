//! Content store over a [`StorageProvider`], versioned by blob hash

use super::{RemoteContentStore, RemoteFile, VersionToken};
use crate::error::{QuireError, Result, StorageError};
use crate::storage::{MemoryStorage, StorageProvider};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Content store that keeps files in a storage backend
///
/// Tokens are SHA-256 hashes of `blob <len>\0<content>`, so identical content
/// always has the same token.
pub struct LocalContentStore {
    storage: Arc<dyn StorageProvider>,
    // Makes compare-and-swap writes atomic
    write_lock: Mutex<()>,
}

impl LocalContentStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by memory (for testing)
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Token of a given content
    pub fn token_for(content: &[u8]) -> VersionToken {
        let mut hasher = Sha256::new();
        hasher.update(format!("blob {}\0", content.len()).as_bytes());
        hasher.update(content);
        VersionToken::new(hex::encode(hasher.finalize()))
    }

    async fn load(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.storage.read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl RemoteContentStore for LocalContentStore {
    async fn read_file(&self, path: &str) -> Result<Option<RemoteFile>> {
        Ok(self.load(path).await?.map(|content| RemoteFile {
            token: Self::token_for(&content),
            content,
        }))
    }

    async fn write_file(
        &self,
        path: &str,
        content: Vec<u8>,
        message: &str,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken> {
        let _guard = self.write_lock.lock().await;

        let current = self.load(path).await?.map(|c| Self::token_for(&c));
        if current.as_ref() != expected {
            tracing::debug!(
                path,
                expected = ?expected.map(VersionToken::as_str),
                current = ?current.as_ref().map(VersionToken::as_str),
                "rejecting stale write"
            );
            return Err(QuireError::Conflict {
                path: path.to_string(),
            });
        }

        let token = Self::token_for(&content);
        self.storage.write(path, content).await?;
        tracing::debug!(path, token = %token, message, "file written");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_write_then_read() {
        let store = LocalContentStore::in_memory();
        assert!(store.read_file("books.json").await.unwrap().is_none());

        let token = store
            .write_file("books.json", b"[]".to_vec(), "create", None)
            .await
            .unwrap();
        let file = store.read_file("books.json").await.unwrap().unwrap();
        assert_eq!(file.content, b"[]");
        assert_eq!(file.token, token);
    }

    #[tokio::test]
    async fn test_stale_token_conflicts() {
        let store = LocalContentStore::in_memory();
        let first = store
            .write_file("a.txt", b"one".to_vec(), "m", None)
            .await
            .unwrap();
        store
            .write_file("a.txt", b"two".to_vec(), "m", Some(&first))
            .await
            .unwrap();

        let err = store
            .write_file("a.txt", b"three".to_vec(), "m", Some(&first))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        let file = store.read_file("a.txt").await.unwrap().unwrap();
        assert_eq!(file.content, b"two");
    }

    #[tokio::test]
    async fn test_create_over_existing_conflicts() {
        let store = LocalContentStore::in_memory();
        store
            .write_file("a.txt", b"one".to_vec(), "m", None)
            .await
            .unwrap();
        let err = store
            .write_file("a.txt", b"again".to_vec(), "m", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_update_of_missing_file_conflicts() {
        let store = LocalContentStore::in_memory();
        let token = LocalContentStore::token_for(b"ghost");
        let err = store
            .write_file("gone.txt", b"x".to_vec(), "m", Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
