//! The service boundary.
//!
//! [`CryptoService`] exposes the crypto and key-store operations to callers
//! across a process/transport boundary. Each operation:
//!
//! 1. validates argument shape synchronously, before any dispatch;
//! 2. checks the caller's [`CancelToken`]; a cancelled call performs no
//!    observable side effects;
//! 3. dispatches the real work onto a worker context decoupled from the
//!    caller (CPU-bound cipher work on the blocking pool, store work on a
//!    spawned task), so a slow cipher call never blocks the
//!    request-handling path;
//! 4. returns exactly one typed result or one typed error.
//!
//! Per-identifier serialization comes from the key store's lock map, so
//! independent requests run concurrently while requests touching the same
//! identifier cannot interleave.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use vaultcore_crypto::{
    AeadCipher, CryptoError, Envelope, KeySize, MAX_RANDOM_LEN, SecureBytes, SymmetricKey,
};
use vaultcore_keystore::{KeyStore, RotationCoordinator, SecretStore};
use zeroize::Zeroize;

use crate::{
    cancel::CancelToken,
    connection::{ConnectionMonitor, LinkState},
    error::ServiceError,
};

/// Result of a key rotation as seen across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotatedKey {
    /// The freshly generated key now stored under the identifier
    pub new_key: Vec<u8>,
    /// The supplied ciphertext re-encrypted under the new key, if any
    pub reencrypted: Option<Vec<u8>>,
}

struct Inner {
    cipher: AeadCipher,
    store: Arc<KeyStore>,
    rotation: RotationCoordinator,
    connection: Mutex<ConnectionMonitor>,
}

/// Async handle to the crypto service.
///
/// Cheap to clone; all clones share the same store and connection monitor.
/// Construct one per composition root and hand clones to consumers; there
/// is no global instance.
#[derive(Clone)]
pub struct CryptoService {
    inner: Arc<Inner>,
}

impl CryptoService {
    /// Build a service over a secret-store collaborator.
    ///
    /// `storage_location` labels the backend in audit metadata (for example
    /// `"memory"` or `"keychain"`).
    pub fn new(backend: Arc<dyn SecretStore>, storage_location: impl Into<String>) -> Self {
        let cipher = AeadCipher::new();
        let store = Arc::new(KeyStore::new(backend, storage_location));
        let rotation = RotationCoordinator::new(Arc::clone(&store), cipher.clone());
        Self {
            inner: Arc::new(Inner {
                cipher,
                store,
                rotation,
                connection: Mutex::new(ConnectionMonitor::new()),
            }),
        }
    }

    /// Encrypt `plaintext` under `key`, returning the envelope wire bytes
    /// (`nonce || ciphertext || tag`).
    pub async fn encrypt(
        &self,
        plaintext: Vec<u8>,
        mut key: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ServiceError> {
        let parsed = SymmetricKey::from_bytes(&key);
        key.zeroize();
        let parsed = parsed?;

        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        run_blocking(move || {
            // Move the plaintext into a zeroizing buffer for the worker's
            // lifetime; it is wiped when the closure scope ends.
            let plaintext = SecureBytes::from(plaintext);
            let envelope = inner.cipher.encrypt(plaintext.as_slice(), &parsed)?;
            Ok(envelope.to_bytes())
        })
        .await
    }

    /// Decrypt envelope wire bytes under `key`, returning the plaintext.
    pub async fn decrypt(
        &self,
        envelope: Vec<u8>,
        mut key: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ServiceError> {
        let parsed_key = SymmetricKey::from_bytes(&key);
        key.zeroize();
        let parsed_key = parsed_key?;
        let parsed_envelope = Envelope::from_bytes(&envelope)?;

        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        run_blocking(move || {
            let plaintext = inner.cipher.decrypt(&parsed_envelope, &parsed_key)?;
            Ok(plaintext.as_slice().to_vec())
        })
        .await
    }

    /// Generate a key of `bits` length (128 or 256), returning its bytes.
    pub async fn generate_key(
        &self,
        bits: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ServiceError> {
        let size = KeySize::from_bits(bits)?;
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        run_blocking(move || Ok(inner.cipher.generate_key(size).as_bytes().to_vec())).await
    }

    /// Generate `length` cryptographically random bytes.
    pub async fn generate_random(
        &self,
        length: usize,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ServiceError> {
        if length == 0 || length > MAX_RANDOM_LEN {
            return Err(CryptoError::InvalidLength { requested: length, max: MAX_RANDOM_LEN }
                .into());
        }
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        run_blocking(move || {
            let bytes = inner.cipher.generate_random(length)?;
            Ok(bytes.as_slice().to_vec())
        })
        .await
    }

    /// Rotate the key under `identifier`, optionally re-encrypting
    /// `ciphertext` so it stays decryptable under the new key.
    pub async fn rotate_key(
        &self,
        identifier: &str,
        ciphertext: Option<Vec<u8>>,
        cancel: &CancelToken,
    ) -> Result<RotatedKey, ServiceError> {
        validate_identifier(identifier)?;
        let parsed = match ciphertext {
            Some(bytes) => Some(Envelope::from_bytes(&bytes)?),
            None => None,
        };
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        run_task(async move {
            let outcome = inner.rotation.rotate(&identifier, parsed.as_ref()).await?;
            Ok(RotatedKey {
                new_key: outcome.new_key.as_bytes().to_vec(),
                reencrypted: outcome.reencrypted.map(|envelope| envelope.to_bytes()),
            })
        })
        .await
    }

    /// Store an opaque secret under `identifier`.
    pub async fn store_credential(
        &self,
        identifier: &str,
        secret: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<(), ServiceError> {
        validate_identifier(identifier)?;
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        let secret = SecureBytes::from(secret);
        run_task(async move {
            inner.store.add(&secret, &identifier).await?;
            Ok(())
        })
        .await
    }

    /// Fetch the secret stored under `identifier`.
    pub async fn retrieve_credential(
        &self,
        identifier: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>, ServiceError> {
        validate_identifier(identifier)?;
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        run_task(async move {
            let (bytes, _metadata) = inner.store.retrieve(&identifier).await?;
            Ok(bytes.as_slice().to_vec())
        })
        .await
    }

    /// Delete the secret stored under `identifier`.
    pub async fn delete_credential(
        &self,
        identifier: &str,
        cancel: &CancelToken,
    ) -> Result<(), ServiceError> {
        validate_identifier(identifier)?;
        check_cancelled(cancel)?;

        let inner = Arc::clone(&self.inner);
        let identifier = identifier.to_string();
        run_task(async move {
            inner.store.delete(&identifier).await?;
            Ok(())
        })
        .await
    }

    /// Direct access to the key store for in-process consumers (the
    /// credential manager composes on this rather than going through the
    /// byte-level boundary API).
    pub fn store(&self) -> &Arc<KeyStore> {
        &self.inner.store
    }

    /// The transport established a connection with this session handle.
    pub async fn connection_established(&self, session: u64) {
        self.inner.connection.lock().await.established(session);
    }

    /// The transport reported an interruption; cached connection state is
    /// cleared and the next call re-establishes.
    pub async fn connection_interrupted(&self) {
        self.inner.connection.lock().await.interrupted();
    }

    /// The transport reported the connection invalid; cached connection
    /// state is cleared.
    pub async fn connection_invalidated(&self) {
        self.inner.connection.lock().await.invalidated();
    }

    /// Current connection state.
    pub async fn connection_state(&self) -> LinkState {
        self.inner.connection.lock().await.state()
    }

    /// True if the next call must establish a connection first.
    pub async fn needs_reconnect(&self) -> bool {
        self.inner.connection.lock().await.needs_reconnect()
    }
}

fn validate_identifier(identifier: &str) -> Result<(), ServiceError> {
    if identifier.trim().is_empty() {
        return Err(ServiceError::InvalidCredentialIdentifier);
    }
    Ok(())
}

fn check_cancelled(cancel: &CancelToken) -> Result<(), ServiceError> {
    if cancel.is_cancelled() {
        tracing::debug!("operation cancelled before dispatch");
        return Err(ServiceError::Cancelled);
    }
    Ok(())
}

/// Run CPU-bound cipher work on the blocking pool. A panicked or aborted
/// worker surfaces as `Internal`, never as a hang.
async fn run_blocking<T, F>(work: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ServiceError::Internal { reason: format!("worker failed: {e}") })?
}

/// Run store-touching work on a spawned task, decoupled from the caller's
/// context.
async fn run_task<T>(
    work: impl Future<Output = Result<T, ServiceError>> + Send + 'static,
) -> Result<T, ServiceError>
where
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| ServiceError::Internal { reason: format!("worker failed: {e}") })?
}
