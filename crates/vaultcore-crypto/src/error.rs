//! Error types for the cryptographic layer.
//!
//! Every failure mode is a distinct, matchable variant. Decryption failure
//! carries a reason so callers can distinguish a tampered envelope from one
//! that is structurally too short, without ever seeing partial plaintext.

use thiserror::Error;

/// Why a decryption call was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptFailure {
    /// The authentication tag did not verify. The envelope was tampered
    /// with, or the wrong key was supplied. No plaintext is produced.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The envelope is shorter than `nonce || tag` and cannot be framed.
    #[error("malformed envelope: {len} bytes is below the {min}-byte minimum")]
    MalformedEnvelope {
        /// Length of the rejected input
        len: usize,
        /// Minimum envelope length (nonce + tag)
        min: usize,
    },
}

/// Errors produced by buffers, codecs and the AEAD cipher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Requested or provided key size is unsupported (only 128 and 256 bit
    /// keys are accepted).
    #[error("unsupported key size: {bits} bits")]
    InvalidKeySize {
        /// The offending size in bits
        bits: u32,
    },

    /// Requested random-byte length is out of range.
    #[error("invalid random length: {requested} (must be 1..={max})")]
    InvalidLength {
        /// The rejected length
        requested: usize,
        /// Largest length a single call may request
        max: usize,
    },

    /// Malformed hex or base64 input.
    #[error("invalid encoding: {reason}")]
    InvalidEncoding {
        /// What the decoder rejected
        reason: String,
    },

    /// Slice or split position outside buffer bounds.
    #[error("index {index} out of bounds for buffer of length {len}")]
    OutOfBounds {
        /// The offending index
        index: usize,
        /// Length of the buffer at the time of the call
        len: usize,
    },

    /// The underlying cipher primitive rejected an encryption call.
    #[error("encryption failed: {reason}")]
    EncryptionFailed {
        /// Primitive-level failure description
        reason: String,
    },

    /// Decryption was rejected; see [`DecryptFailure`] for why.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Why the envelope was rejected
        reason: DecryptFailure,
    },
}

impl CryptoError {
    /// Returns true if this error indicates tampered or forged ciphertext.
    ///
    /// Structural errors (short envelope, bad key size) are caller mistakes;
    /// a failed tag is the only variant that implies an active attacker or
    /// key mismatch.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::DecryptionFailed { reason: DecryptFailure::AuthenticationFailed }
        )
    }
}
