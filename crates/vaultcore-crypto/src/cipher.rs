//! Authenticated encryption (AES-GCM) over the fixed envelope format.
//!
//! Every encryption draws a fresh 12-byte random nonce and produces an
//! [`Envelope`] whose wire form is `nonce || ciphertext || tag`. Decryption
//! verifies the 16-byte tag while decrypting; a failed tag yields an error
//! and never any plaintext.
//!
//! # Security
//!
//! - Nonces come from the OS RNG and are never reused for a key by
//!   construction (fresh draw per call)
//! - Tag verification failure is indistinguishable from a wrong key; neither
//!   case exposes partial output
//! - Key material lives in [`SecureBytes`] and is zeroized on drop

use aes_gcm::{
    Aes128Gcm, Aes256Gcm,
    aead::{Aead, AeadCore, KeyInit, consts::U12, generic_array::GenericArray},
};
use rand::{RngCore, rngs::OsRng};

use crate::{
    buffer::SecureBytes,
    error::{CryptoError, DecryptFailure},
};

/// Nonce length in bytes (96-bit GCM nonce).
pub const NONCE_SIZE: usize = 12;

/// Authentication tag length in bytes (128-bit tag).
pub const TAG_SIZE: usize = 16;

/// Smallest possible envelope: empty plaintext is still framed by a nonce
/// and a tag.
pub const MIN_ENVELOPE_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Largest random-byte request served by [`AeadCipher::generate_random`].
/// Random bytes are for nonces, salts and ephemeral IVs; 1 MiB is far above
/// any legitimate request and bounds allocation at the boundary.
pub const MAX_RANDOM_LEN: usize = 1 << 20;

/// Supported symmetric key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    /// AES-128-GCM (16-byte key)
    Bits128,
    /// AES-256-GCM (32-byte key)
    Bits256,
}

impl KeySize {
    /// Resolve a declared bit length.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidKeySize` for anything but 128 or 256
    pub fn from_bits(bits: u32) -> Result<Self, CryptoError> {
        match bits {
            128 => Ok(Self::Bits128),
            256 => Ok(Self::Bits256),
            _ => Err(CryptoError::InvalidKeySize { bits }),
        }
    }

    /// Declared size in bits.
    pub fn bits(self) -> u32 {
        match self {
            Self::Bits128 => 128,
            Self::Bits256 => 256,
        }
    }

    /// Key length in bytes (`bits / 8`).
    pub fn byte_len(self) -> usize {
        match self {
            Self::Bits128 => 16,
            Self::Bits256 => 32,
        }
    }
}

/// A symmetric key of a supported size.
///
/// The invariant `material.len() == size.byte_len()` is established at
/// construction and holds for the lifetime of the value. Material is
/// zeroized on drop and never printed by `Debug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    material: SecureBytes,
    size: KeySize,
}

impl SymmetricKey {
    /// Build a key by copying raw bytes.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidKeySize` if the slice is not 16 or 32 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let size = match bytes.len() {
            16 => KeySize::Bits128,
            32 => KeySize::Bits256,
            other => return Err(CryptoError::InvalidKeySize { bits: other as u32 * 8 }),
        };
        Ok(Self { material: SecureBytes::from_slice(bytes), size })
    }

    /// Declared key size.
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.material.as_slice()
    }
}

/// Ciphertext envelope: `nonce || ciphertext || tag` on the wire.
///
/// # Invariants
///
/// - Wire length is always `28 + plaintext_len` bytes
/// - [`Envelope::from_bytes`] rejects anything shorter than 28 bytes before
///   any cipher work happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Random 12-byte nonce drawn fresh per encryption
    nonce: [u8; NONCE_SIZE],
    /// Ciphertext, same length as the plaintext
    ciphertext: Vec<u8>,
    /// 16-byte GCM authentication tag
    tag: [u8; TAG_SIZE],
}

impl Envelope {
    /// Parse an envelope from its wire form.
    ///
    /// # Errors
    ///
    /// - `CryptoError::DecryptionFailed(MalformedEnvelope)` if the input is
    ///   shorter than [`MIN_ENVELOPE_SIZE`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_ENVELOPE_SIZE {
            return Err(CryptoError::DecryptionFailed {
                reason: DecryptFailure::MalformedEnvelope {
                    len: bytes.len(),
                    min: MIN_ENVELOPE_SIZE,
                },
            });
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&bytes[..NONCE_SIZE]);

        let tag_start = bytes.len() - TAG_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&bytes[tag_start..]);

        Ok(Self { nonce, ciphertext: bytes[NONCE_SIZE..tag_start].to_vec(), tag })
    }

    /// Serialize to the wire form `nonce || ciphertext || tag`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Total wire length (`28 + plaintext_len`).
    pub fn wire_len(&self) -> usize {
        NONCE_SIZE + self.ciphertext.len() + TAG_SIZE
    }

    /// Length of the plaintext this envelope decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len()
    }

    /// The nonce this envelope was sealed under.
    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    #[cfg(test)]
    pub(crate) fn tamper_ciphertext_bit(&mut self, byte: usize, bit: u8) {
        self.ciphertext[byte] ^= 1 << bit;
    }

    #[cfg(test)]
    pub(crate) fn tamper_tag_bit(&mut self, byte: usize, bit: u8) {
        self.tag[byte] ^= 1 << bit;
    }
}

/// AES-GCM cipher plus key/random generation.
///
/// Stateless; construct one per composition root and hand it to consumers.
/// No global instance exists.
#[derive(Debug, Default, Clone)]
pub struct AeadCipher {
    _private: (),
}

impl AeadCipher {
    /// Create a cipher instance.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Encrypt `plaintext` under `key` with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// - `CryptoError::EncryptionFailed` if the primitive rejects the input
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        key: &SymmetricKey,
    ) -> Result<Envelope, CryptoError> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let mut sealed = match key.size() {
            KeySize::Bits128 => seal::<Aes128Gcm>(key.as_bytes(), &nonce, plaintext)?,
            KeySize::Bits256 => seal::<Aes256Gcm>(key.as_bytes(), &nonce, plaintext)?,
        };

        // AES-GCM appends the tag to the ciphertext; peel it back off so
        // the envelope owns the two regions separately.
        let tag_start = sealed.len() - TAG_SIZE;
        let tag_bytes = sealed.split_off(tag_start);
        let Ok(tag) = <[u8; TAG_SIZE]>::try_from(tag_bytes.as_slice()) else {
            unreachable!("AES-GCM always appends a {TAG_SIZE}-byte tag");
        };

        Ok(Envelope { nonce, ciphertext: sealed, tag })
    }

    /// Decrypt an envelope, verifying the tag.
    ///
    /// # Errors
    ///
    /// - `CryptoError::DecryptionFailed(AuthenticationFailed)` if the tag
    ///   does not verify; no plaintext is produced in that case
    pub fn decrypt(
        &self,
        envelope: &Envelope,
        key: &SymmetricKey,
    ) -> Result<SecureBytes, CryptoError> {
        let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + TAG_SIZE);
        sealed.extend_from_slice(&envelope.ciphertext);
        sealed.extend_from_slice(&envelope.tag);

        let plaintext = match key.size() {
            KeySize::Bits128 => open::<Aes128Gcm>(key.as_bytes(), &envelope.nonce, &sealed)?,
            KeySize::Bits256 => open::<Aes256Gcm>(key.as_bytes(), &envelope.nonce, &sealed)?,
        };

        Ok(SecureBytes::from(plaintext))
    }

    /// Generate a fresh key of the given size from the OS RNG.
    pub fn generate_key(&self, size: KeySize) -> SymmetricKey {
        let mut bytes = vec![0u8; size.byte_len()];
        OsRng.fill_bytes(&mut bytes);
        SymmetricKey { material: SecureBytes::from(bytes), size }
    }

    /// Generate `len` cryptographically random bytes for nonces and salts.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidLength` if `len` is zero or above
    ///   [`MAX_RANDOM_LEN`]
    pub fn generate_random(&self, len: usize) -> Result<SecureBytes, CryptoError> {
        if len == 0 || len > MAX_RANDOM_LEN {
            return Err(CryptoError::InvalidLength { requested: len, max: MAX_RANDOM_LEN });
        }
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        Ok(SecureBytes::from(bytes))
    }
}

fn seal<C>(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    let Ok(cipher) = C::new_from_slice(key) else {
        unreachable!("key length is validated when the SymmetricKey is constructed");
    };
    cipher
        .encrypt(GenericArray::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed { reason: e.to_string() })
}

fn open<C>(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    sealed: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + KeyInit + AeadCore<NonceSize = U12>,
{
    let Ok(cipher) = C::new_from_slice(key) else {
        unreachable!("key length is validated when the SymmetricKey is constructed");
    };
    cipher
        .decrypt(GenericArray::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::DecryptionFailed {
            reason: DecryptFailure::AuthenticationFailed,
        })
}
