//! Hex and base64 import/export for [`SecureBytes`].
//!
//! Decoding is strict: disallowed characters, odd hex length and wrong
//! base64 padding all fail with [`CryptoError::InvalidEncoding`] rather than
//! being repaired or ignored.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::{buffer::SecureBytes, error::CryptoError};

impl SecureBytes {
    /// Encode the contents as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    /// Decode a hex string into a new buffer.
    ///
    /// Accepts upper- and lowercase digits.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidEncoding` on odd length or non-hex characters
    pub fn from_hex(encoded: &str) -> Result<SecureBytes, CryptoError> {
        let bytes = hex::decode(encoded)
            .map_err(|e| CryptoError::InvalidEncoding { reason: e.to_string() })?;
        Ok(SecureBytes::from(bytes))
    }

    /// Encode the contents as standard base64 (with padding).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.as_slice())
    }

    /// Decode a standard base64 string into a new buffer.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidEncoding` on disallowed characters or wrong
    ///   padding
    pub fn from_base64(encoded: &str) -> Result<SecureBytes, CryptoError> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidEncoding { reason: e.to_string() })?;
        Ok(SecureBytes::from(bytes))
    }
}
