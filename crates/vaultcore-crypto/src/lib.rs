//! Vaultcore Cryptographic Primitives
//!
//! Secure byte handling and authenticated encryption for the vaultcore
//! key-management service. Three layers, leaves first:
//!
//! - [`SecureBytes`]: value-semantic byte container that zeroizes on drop
//! - hex/base64 codecs with strict, typed decode failures
//! - [`AeadCipher`]: AES-128/256-GCM over the fixed envelope format
//!
//! ```text
//! plaintext ──encrypt──▶ nonce(12) ║ ciphertext(N) ║ tag(16)
//!                                   │
//!                        decrypt ◀──┘  (tag verified, or no output at all)
//! ```
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - AES-GCM with a 128-bit tag; tag verification failure produces a typed
//!   error and never partial plaintext
//! - Fresh random nonce per encryption; nonce reuse cannot occur for a key
//!   because nonces are never caller-supplied
//!
//! Memory hygiene:
//! - Key material and recovered plaintext live in [`SecureBytes`]
//! - Buffers are zeroized on drop and on explicit
//!   [`secure_zero`](SecureBytes::secure_zero)
//! - No secret type implements a content-revealing `Debug`
//!
//! No global state: [`AeadCipher`] instances are constructed at the
//! composition root and injected into consumers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod buffer;
mod cipher;
mod encoding;
mod error;

pub use buffer::SecureBytes;
pub use cipher::{
    AeadCipher, Envelope, KeySize, MAX_RANDOM_LEN, MIN_ENVELOPE_SIZE, NONCE_SIZE, SymmetricKey,
    TAG_SIZE,
};
pub use error::{CryptoError, DecryptFailure};
