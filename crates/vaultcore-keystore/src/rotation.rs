//! Key rotation with optional re-encryption.
//!
//! Rotation replaces the stored key with a freshly generated one of the same
//! size and, when ciphertext is supplied, re-encrypts it so it stays
//! decryptable under the new key. The whole sequence runs under the
//! identifier's lock and is all-or-nothing: any failure before the store
//! update leaves the old key fully intact and retrievable, and no
//! intermediate state is observable by other callers.

use std::sync::Arc;

use vaultcore_crypto::{AeadCipher, Envelope, SecureBytes, SymmetricKey};

use crate::{
    error::StoreError,
    store::{KeyStore, validate_identifier},
};

/// What a successful rotation produced.
#[derive(Debug)]
pub struct RotationOutcome {
    /// The freshly generated key now stored under the identifier
    pub new_key: SymmetricKey,
    /// The supplied ciphertext re-encrypted under the new key, if any
    pub reencrypted: Option<Envelope>,
}

/// Orchestrates replacing a stored key and re-encrypting dependent
/// ciphertext atomically.
pub struct RotationCoordinator {
    store: Arc<KeyStore>,
    cipher: AeadCipher,
}

impl RotationCoordinator {
    /// Create a coordinator over a store and cipher.
    pub fn new(store: Arc<KeyStore>, cipher: AeadCipher) -> Self {
        Self { store, cipher }
    }

    /// Rotate the key under `identifier`.
    ///
    /// Sequence, entirely under the identifier's lock:
    /// 1. retrieve the current key;
    /// 2. generate a new key of the same bit length;
    /// 3. if `ciphertext` is supplied, decrypt with the old key and
    ///    re-encrypt with the new one; a failed tag aborts the rotation
    ///    with nothing persisted;
    /// 4. persist the new key (version bump) only after step 3 succeeded.
    ///
    /// # Errors
    ///
    /// - `StoreError::KeyNotFound` if no entry exists
    /// - `StoreError::Crypto` if the stored material is not a valid key or
    ///   the supplied ciphertext fails authentication; the old key remains
    ///   authoritative in both cases
    pub async fn rotate(
        &self,
        identifier: &str,
        ciphertext: Option<&Envelope>,
    ) -> Result<RotationOutcome, StoreError> {
        validate_identifier(identifier)?;
        let result = self.rotate_locked(identifier, ciphertext).await;
        self.store.prune_lock(identifier).await;
        result
    }

    async fn rotate_locked(
        &self,
        identifier: &str,
        ciphertext: Option<&Envelope>,
    ) -> Result<RotationOutcome, StoreError> {
        let _guard = self.store.lock_identifier(identifier).await;

        let (material, metadata) = self.store.retrieve_locked(identifier).await?;
        let old_key = SymmetricKey::from_bytes(material.as_slice())?;

        let new_key = self.cipher.generate_key(old_key.size());

        let reencrypted = match ciphertext {
            Some(envelope) => {
                let plaintext = self.cipher.decrypt(envelope, &old_key)?;
                Some(self.cipher.encrypt(plaintext.as_slice(), &new_key)?)
            },
            None => None,
        };

        // Point of no return: everything fallible before the store update
        // has succeeded.
        let new_metadata = self
            .store
            .update_locked(&SecureBytes::from_slice(new_key.as_bytes()), identifier)
            .await?;

        tracing::info!(
            identifier,
            old_version = metadata.version,
            new_version = new_metadata.version,
            reencrypted = reencrypted.is_some(),
            "rotated key"
        );

        Ok(RotationOutcome { new_key, reencrypted })
    }
}
