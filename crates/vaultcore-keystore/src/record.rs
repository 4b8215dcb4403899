//! Persisted key record.
//!
//! Material and metadata travel together as one CBOR blob per identifier,
//! so the secret-store collaborator only ever sees opaque bytes.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{error::StoreError, metadata::KeyMetadata};

/// The unit of storage: raw material plus its lifecycle metadata.
///
/// Material is zeroized when the record is dropped.
#[derive(Serialize, Deserialize)]
pub(crate) struct KeyRecord {
    /// Raw secret bytes (key material or opaque credential)
    pub material: Vec<u8>,
    /// Lifecycle metadata
    pub metadata: KeyMetadata,
}

impl KeyRecord {
    /// Encode to the CBOR wire form stored in the backend.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| StoreError::Serialization { reason: e.to_string() })?;
        Ok(buf)
    }

    /// Decode a blob previously produced by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        ciborium::from_reader(bytes)
            .map_err(|e: ciborium::de::Error<std::io::Error>| StoreError::Serialization {
                reason: e.to_string(),
            })
    }
}

impl Drop for KeyRecord {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}
