//! Vaultcore Key Storage and Rotation
//!
//! Authoritative storage for named key material and opaque credentials,
//! persisted through an external secret-store collaborator, plus the
//! rotation coordinator that replaces keys atomically.
//!
//! # Concurrency
//!
//! The store serializes all operations per identifier through a lock map:
//! concurrent `rotate` and `retrieve`/`update` calls on the same identifier
//! cannot interleave, so no caller ever observes a half-rotated key or
//! loses an update. Independent identifiers proceed concurrently with no
//! ordering guarantees between them.
//!
//! # Ownership
//!
//! The authoritative bytes live only in the secret-store backend. Every
//! value handed to a caller is an independent [`SecureBytes`] copy that
//! zeroizes on drop.
//!
//! [`SecureBytes`]: vaultcore_crypto::SecureBytes

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod metadata;
mod record;
mod rotation;
mod secret_store;
mod store;

pub use error::StoreError;
pub use metadata::{KeyMetadata, KeyStatus};
pub use rotation::{RotationCoordinator, RotationOutcome};
pub use secret_store::{MemorySecretStore, SecretStore};
pub use store::KeyStore;
