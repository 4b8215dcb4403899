//! Key store with per-identifier mutual exclusion.
//!
//! Owns the authoritative mapping from identifier to current material and
//! metadata, persisting through the [`SecretStore`] collaborator. Every
//! mutating or reading operation on an identifier runs under that
//! identifier's lock, so concurrent calls on the same entry cannot
//! interleave and produce a lost update or a read of a half-rotated key.
//! Operations on different identifiers proceed concurrently.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};
use vaultcore_crypto::SecureBytes;

use crate::{
    error::StoreError,
    metadata::{KeyMetadata, KeyStatus},
    record::KeyRecord,
    secret_store::SecretStore,
};

/// Reject empty and whitespace-only identifiers before any backend access.
pub(crate) fn validate_identifier(identifier: &str) -> Result<(), StoreError> {
    if identifier.trim().is_empty() {
        return Err(StoreError::InvalidIdentifier);
    }
    Ok(())
}

/// Add/retrieve/update/delete of named secret material.
///
/// Callers only ever hold copies of material; the store (through its
/// backend) is the sole owner of the authoritative bytes.
pub struct KeyStore {
    backend: Arc<dyn SecretStore>,
    storage_location: String,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyStore {
    /// Create a store over a secret-store collaborator.
    ///
    /// `storage_location` is a label stamped into metadata for audit output
    /// (for example `"memory"` or `"keychain"`).
    pub fn new(backend: Arc<dyn SecretStore>, storage_location: impl Into<String>) -> Self {
        Self {
            backend,
            storage_location: storage_location.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the identifier's lock. Held guards serialize all operations
    /// on that identifier, including multi-step rotation.
    pub(crate) async fn lock_identifier(&self, identifier: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(identifier.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the identifier's lock entry once nothing holds or waits on it.
    /// Called after every operation so the map stays bounded by the number
    /// of identifiers currently in flight, not ever seen.
    pub(crate) async fn prune_lock(&self, identifier: &str) {
        let mut locks = self.locks.lock().await;
        if locks.get(identifier).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(identifier);
        }
    }

    #[cfg(test)]
    pub(crate) async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Store new material under `identifier`.
    ///
    /// # Errors
    ///
    /// - `StoreError::DuplicateKey` if an entry already exists
    /// - `StoreError::InvalidIdentifier` for empty identifiers
    pub async fn add(
        &self,
        material: &SecureBytes,
        identifier: &str,
    ) -> Result<KeyMetadata, StoreError> {
        validate_identifier(identifier)?;
        let result = {
            let _guard = self.lock_identifier(identifier).await;
            self.add_locked(material, identifier).await
        };
        self.prune_lock(identifier).await;
        result
    }

    pub(crate) async fn add_locked(
        &self,
        material: &SecureBytes,
        identifier: &str,
    ) -> Result<KeyMetadata, StoreError> {
        if self.backend.get(identifier).await?.is_some() {
            return Err(StoreError::DuplicateKey { identifier: identifier.to_string() });
        }

        let metadata = KeyMetadata::new(identifier, &self.storage_location);
        let record =
            KeyRecord { material: material.as_slice().to_vec(), metadata: metadata.clone() };
        self.backend.put(identifier, record.encode()?).await?;

        tracing::debug!(identifier, len = material.len(), "stored new entry");
        Ok(metadata)
    }

    /// Fetch the current material and metadata under `identifier`.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotFound` if absent
    pub async fn retrieve(
        &self,
        identifier: &str,
    ) -> Result<(SecureBytes, KeyMetadata), StoreError> {
        validate_identifier(identifier)?;
        let result = {
            let _guard = self.lock_identifier(identifier).await;
            self.retrieve_locked(identifier).await
        };
        self.prune_lock(identifier).await;
        result
    }

    pub(crate) async fn retrieve_locked(
        &self,
        identifier: &str,
    ) -> Result<(SecureBytes, KeyMetadata), StoreError> {
        let record = self.load_record(identifier).await?;
        Ok((SecureBytes::from_slice(&record.material), record.metadata.clone()))
    }

    /// Replace the material under `identifier`, bumping the version.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotFound` if absent
    pub async fn update(
        &self,
        material: &SecureBytes,
        identifier: &str,
    ) -> Result<KeyMetadata, StoreError> {
        validate_identifier(identifier)?;
        let result = {
            let _guard = self.lock_identifier(identifier).await;
            self.update_locked(material, identifier).await
        };
        self.prune_lock(identifier).await;
        result
    }

    pub(crate) async fn update_locked(
        &self,
        material: &SecureBytes,
        identifier: &str,
    ) -> Result<KeyMetadata, StoreError> {
        let mut record = self.load_record(identifier).await?;

        record.material.clear();
        record.material.extend_from_slice(material.as_slice());
        record.metadata.record_material_change();

        let metadata = record.metadata.clone();
        self.backend.put(identifier, record.encode()?).await?;

        tracing::debug!(identifier, version = metadata.version, "replaced entry material");
        Ok(metadata)
    }

    /// Remove the entry under `identifier`.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotFound` if absent
    pub async fn delete(&self, identifier: &str) -> Result<(), StoreError> {
        validate_identifier(identifier)?;
        let result = {
            let _guard = self.lock_identifier(identifier).await;
            self.delete_locked(identifier).await
        };
        self.prune_lock(identifier).await;
        result
    }

    async fn delete_locked(&self, identifier: &str) -> Result<(), StoreError> {
        if !self.backend.remove(identifier).await? {
            return Err(StoreError::KeyNotFound { identifier: identifier.to_string() });
        }
        tracing::debug!(identifier, "deleted entry");
        Ok(())
    }

    /// Change the lifecycle status of the entry under `identifier`.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotFound` if absent
    /// - `StoreError::InvalidStatusTransition` if the lifecycle forbids it
    pub async fn set_status(
        &self,
        identifier: &str,
        status: KeyStatus,
    ) -> Result<KeyMetadata, StoreError> {
        validate_identifier(identifier)?;
        let result = {
            let _guard = self.lock_identifier(identifier).await;
            self.set_status_locked(identifier, status).await
        };
        self.prune_lock(identifier).await;
        result
    }

    async fn set_status_locked(
        &self,
        identifier: &str,
        status: KeyStatus,
    ) -> Result<KeyMetadata, StoreError> {
        let mut record = self.load_record(identifier).await?;
        record.metadata.transition(status)?;

        let metadata = record.metadata.clone();
        self.backend.put(identifier, record.encode()?).await?;

        tracing::debug!(identifier, %status, "changed entry status");
        Ok(metadata)
    }

    async fn load_record(&self, identifier: &str) -> Result<KeyRecord, StoreError> {
        let blob = self
            .backend
            .get(identifier)
            .await?
            .ok_or_else(|| StoreError::KeyNotFound { identifier: identifier.to_string() })?;
        KeyRecord::decode(&blob)
    }
}
