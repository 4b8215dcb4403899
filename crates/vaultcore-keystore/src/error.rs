//! Error types for key storage and rotation.
//!
//! Identifier conflicts (`KeyNotFound`, `DuplicateKey`) carry the identifier
//! so callers can report which entry was involved. Backend failures from the
//! secret-store collaborator are stringly typed here and mapped to a
//! service-availability error at the boundary.

use thiserror::Error;
use vaultcore_crypto::CryptoError;

use crate::metadata::KeyStatus;

/// Errors produced by the key store and rotation coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Identifier is empty or whitespace-only.
    #[error("invalid identifier: must be non-empty")]
    InvalidIdentifier,

    /// No entry exists under this identifier.
    #[error("key not found: {identifier}")]
    KeyNotFound {
        /// The identifier that was looked up
        identifier: String,
    },

    /// An entry already exists under this identifier.
    #[error("duplicate key: {identifier}")]
    DuplicateKey {
        /// The identifier that collided
        identifier: String,
    },

    /// The requested status change violates the lifecycle state machine.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        /// Status before the attempted change
        from: KeyStatus,
        /// Rejected target status
        to: KeyStatus,
    },

    /// The secret-store collaborator failed or is unreachable.
    #[error("secret store backend error: {reason}")]
    Backend {
        /// Collaborator-level failure description
        reason: String,
    },

    /// The persisted key record could not be encoded or decoded.
    #[error("record serialization error: {reason}")]
    Serialization {
        /// Codec-level failure description
        reason: String,
    },

    /// A cryptographic operation inside rotation failed. Rotation aborts
    /// and the stored key is left untouched.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
