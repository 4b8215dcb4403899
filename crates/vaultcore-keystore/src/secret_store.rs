//! Secret-store collaborator contract.
//!
//! The durable, access-controlled blob store (OS keychain, HSM bridge,
//! remote vault) lives outside this crate. [`SecretStore`] is the contract
//! it must satisfy; [`MemorySecretStore`] is the reference backend used by
//! tests and ephemeral deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use zeroize::Zeroize;

use crate::error::StoreError;

/// Durable storage for opaque byte blobs keyed by identifier.
///
/// Implementations report reachability problems as `StoreError::Backend`;
/// existence checks and conflict rules are enforced above this trait by the
/// key store, not here.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store `value` under `identifier`, replacing any previous blob.
    async fn put(&self, identifier: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Fetch the blob under `identifier`, or `None` if absent.
    async fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove the blob under `identifier`. Returns whether it existed.
    async fn remove(&self, identifier: &str) -> Result<bool, StoreError>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs (test observability).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, identifier: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if let Some(mut previous) = entries.insert(identifier.to_string(), value) {
            previous.zeroize();
        }
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().await.get(identifier).cloned())
    }

    async fn remove(&self, identifier: &str) -> Result<bool, StoreError> {
        match self.entries.lock().await.remove(identifier) {
            Some(mut value) => {
                value.zeroize();
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_remove() {
        let store = MemorySecretStore::new();

        store.put("a", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.len().await, 1);

        assert!(store.remove("a").await.unwrap());
        assert_eq!(store.get("a").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_replaces_existing_blob() {
        let store = MemorySecretStore::new();

        store.put("a", vec![1]).await.unwrap();
        store.put("a", vec![2]).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(vec![2]));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_missing_reports_false() {
        let store = MemorySecretStore::new();
        assert!(!store.remove("missing").await.unwrap());
    }
}
