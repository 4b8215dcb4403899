//! Boundary error taxonomy and its wire-stable shape.
//!
//! [`ServiceError`] is the typed error callers of this crate match on.
//! [`WireError`] is the flattened `category + message` form that crosses
//! the process/transport boundary: stable categories, human-readable
//! messages, never a raw internal type.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vaultcore_crypto::CryptoError;
use vaultcore_keystore::StoreError;

/// Errors surfaced by the service boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A cryptographic operation failed (key size, encoding, bounds,
    /// encryption or decryption). The inner kind is preserved unchanged.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

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

    /// Credential identifier is empty or malformed.
    #[error("invalid credential identifier")]
    InvalidCredentialIdentifier,

    /// The caller cancelled before the operation was dispatched. No work
    /// was performed and no state was touched.
    #[error("operation cancelled before dispatch")]
    Cancelled,

    /// The secret-store collaborator or transport is unreachable.
    #[error("service unavailable: {reason}")]
    Unavailable {
        /// What was unreachable
        reason: String,
    },

    /// Unexpected internal failure. The reason is a description, never a
    /// raw internal error type.
    #[error("internal error: {reason}")]
    Internal {
        /// Failure description
        reason: String,
    },
}

/// Map store-layer errors into the boundary taxonomy. Identifier conflicts
/// pass through unchanged in kind; backend failures become availability
/// errors; everything without a boundary meaning collapses to `Internal`.
impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidIdentifier => Self::InvalidCredentialIdentifier,
            StoreError::KeyNotFound { identifier } => Self::KeyNotFound { identifier },
            StoreError::DuplicateKey { identifier } => Self::DuplicateKey { identifier },
            StoreError::Backend { reason } => Self::Unavailable { reason },
            StoreError::Crypto(inner) => Self::Crypto(inner),
            other @ (StoreError::InvalidStatusTransition { .. }
            | StoreError::Serialization { .. }) => Self::Internal { reason: other.to_string() },
        }
    }
}

/// Stable error category crossing the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Unsupported key size
    InvalidKeySize,
    /// Random-byte length out of range
    InvalidLength,
    /// Malformed hex/base64 input
    InvalidEncoding,
    /// Buffer slice/split out of bounds
    OutOfBounds,
    /// Cipher primitive rejected an encryption
    EncryptionFailed,
    /// Tag verification failed or envelope malformed
    DecryptionFailed,
    /// No entry under the identifier
    KeyNotFound,
    /// Entry already exists under the identifier
    DuplicateKey,
    /// Empty or malformed identifier
    InvalidIdentifier,
    /// Cancelled before dispatch
    Cancelled,
    /// Collaborator or transport unreachable
    Unavailable,
    /// Catch-all internal failure
    Internal,
}

/// Serializable error shape for the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    /// Stable category for programmatic handling
    pub category: ErrorCategory,
    /// Human-readable description
    pub message: String,
}

impl From<&ServiceError> for WireError {
    fn from(err: &ServiceError) -> Self {
        let category = match err {
            ServiceError::Crypto(inner) => match inner {
                CryptoError::InvalidKeySize { .. } => ErrorCategory::InvalidKeySize,
                CryptoError::InvalidLength { .. } => ErrorCategory::InvalidLength,
                CryptoError::InvalidEncoding { .. } => ErrorCategory::InvalidEncoding,
                CryptoError::OutOfBounds { .. } => ErrorCategory::OutOfBounds,
                CryptoError::EncryptionFailed { .. } => ErrorCategory::EncryptionFailed,
                CryptoError::DecryptionFailed { .. } => ErrorCategory::DecryptionFailed,
            },
            ServiceError::KeyNotFound { .. } => ErrorCategory::KeyNotFound,
            ServiceError::DuplicateKey { .. } => ErrorCategory::DuplicateKey,
            ServiceError::InvalidCredentialIdentifier => ErrorCategory::InvalidIdentifier,
            ServiceError::Cancelled => ErrorCategory::Cancelled,
            ServiceError::Unavailable { .. } => ErrorCategory::Unavailable,
            ServiceError::Internal { .. } => ErrorCategory::Internal,
        };
        Self { category, message: err.to_string() }
    }
}

impl ServiceError {
    /// Flatten into the wire shape.
    pub fn to_wire(&self) -> WireError {
        WireError::from(self)
    }
}

#[cfg(test)]
mod tests {
    use vaultcore_crypto::DecryptFailure;

    use super::*;

    #[test]
    fn store_conflicts_keep_their_kind() {
        let err: ServiceError =
            StoreError::KeyNotFound { identifier: "k1".into() }.into();
        assert_eq!(err, ServiceError::KeyNotFound { identifier: "k1".into() });

        let err: ServiceError =
            StoreError::DuplicateKey { identifier: "k1".into() }.into();
        assert_eq!(err, ServiceError::DuplicateKey { identifier: "k1".into() });
    }

    #[test]
    fn backend_failure_becomes_unavailable() {
        let err: ServiceError = StoreError::Backend { reason: "vault offline".into() }.into();
        assert_eq!(err, ServiceError::Unavailable { reason: "vault offline".into() });
    }

    #[test]
    fn serialization_failure_collapses_to_internal() {
        let err: ServiceError = StoreError::Serialization { reason: "bad cbor".into() }.into();
        assert!(matches!(err, ServiceError::Internal { .. }));
    }

    #[test]
    fn wire_categories_are_stable() {
        let err = ServiceError::Crypto(CryptoError::DecryptionFailed {
            reason: DecryptFailure::AuthenticationFailed,
        });
        let wire = err.to_wire();
        assert_eq!(wire.category, ErrorCategory::DecryptionFailed);
        assert_eq!(wire.message, "decryption failed: authentication failed");

        let wire = ServiceError::Cancelled.to_wire();
        assert_eq!(wire.category, ErrorCategory::Cancelled);
    }
}
