//! Zeroizing byte container for key material and plaintext.
//!
//! [`SecureBytes`] replaces ad-hoc `Vec<u8>` wherever bytes are sensitive.
//! Every constructor copies its source (no aliasing), every drop path
//! zeroizes, and `Debug` never prints content.

use std::hash::{Hash, Hasher};

use zeroize::Zeroize;

use crate::error::CryptoError;

/// Owned, value-semantic byte buffer that zeroizes its memory on drop.
///
/// Cloning produces an independent copy; two buffers never share storage.
/// Equality and hashing are by content, not identity.
///
/// # Security
///
/// - All bytes are overwritten with zero when the buffer is dropped
/// - [`secure_zero`](Self::secure_zero) wipes in place without changing the
///   length, for buffers that are logically done before their scope ends
/// - `Debug` output contains the length only
pub struct SecureBytes(Vec<u8>);

impl SecureBytes {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty buffer with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Create a buffer by copying a slice.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View the contents as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Append a single byte.
    pub fn push(&mut self, byte: u8) {
        self.0.push(byte);
    }

    /// Append a copy of a slice.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    /// Append a copy of another buffer. The source is unchanged and shares
    /// no storage with `self` afterwards.
    pub fn append(&mut self, other: &SecureBytes) {
        self.0.extend_from_slice(&other.0);
    }

    /// Copy the bytes in `range` into a new buffer.
    ///
    /// # Errors
    ///
    /// - `CryptoError::OutOfBounds` if the range is inverted or its end
    ///   exceeds the buffer length
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<SecureBytes, CryptoError> {
        if range.start > range.end {
            return Err(CryptoError::OutOfBounds { index: range.start, len: self.len() });
        }
        if range.end > self.len() {
            return Err(CryptoError::OutOfBounds { index: range.end, len: self.len() });
        }
        Ok(SecureBytes::from_slice(&self.0[range]))
    }

    /// Split into `(prefix, suffix)` copies at `position`.
    ///
    /// `position == 0` yields an empty prefix; `position == len` yields an
    /// empty suffix. Both halves are independent copies.
    ///
    /// # Errors
    ///
    /// - `CryptoError::OutOfBounds` if `position > len`
    pub fn split_at(&self, position: usize) -> Result<(SecureBytes, SecureBytes), CryptoError> {
        if position > self.len() {
            return Err(CryptoError::OutOfBounds { index: position, len: self.len() });
        }
        let (prefix, suffix) = self.0.split_at(position);
        Ok((SecureBytes::from_slice(prefix), SecureBytes::from_slice(suffix)))
    }

    /// Overwrite every byte with zero, in place. The length is unchanged.
    /// Idempotent.
    pub fn secure_zero(&mut self) {
        self.0.as_mut_slice().zeroize();
    }
}

impl Default for SecureBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for SecureBytes {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecureBytes {}

impl Hash for SecureBytes {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Length only. Content is never formatted.
impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes").field("len", &self.len()).finish_non_exhaustive()
    }
}

impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn hash_of(buf: &SecureBytes) -> u64 {
        let mut hasher = DefaultHasher::new();
        buf.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn from_slice_copies_the_source() {
        let source = vec![1u8, 2, 3];
        let buf = SecureBytes::from_slice(&source);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
        // Source remains intact and independent
        assert_eq!(source, vec![1, 2, 3]);
    }

    #[test]
    fn clone_is_independent() {
        let original = SecureBytes::from_slice(b"secret");
        let mut copy = original.clone();
        copy.secure_zero();

        assert_eq!(original.as_slice(), b"secret");
        assert_eq!(copy.as_slice(), &[0u8; 6]);
    }

    #[test]
    fn append_extends_without_aliasing() {
        let mut buf = SecureBytes::from_slice(&[1, 2]);
        let tail = SecureBytes::from_slice(&[3, 4]);
        buf.append(&tail);

        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(tail.as_slice(), &[3, 4]);
    }

    #[test]
    fn push_appends_single_bytes() {
        let mut buf = SecureBytes::new();
        buf.push(0xAA);
        buf.push(0xBB);
        assert_eq!(buf.as_slice(), &[0xAA, 0xBB]);
    }

    #[test]
    fn slice_copies_requested_range() {
        let buf = SecureBytes::from_slice(&[10, 20, 30, 40, 50]);
        let mid = buf.slice(1..4).unwrap();
        assert_eq!(mid.as_slice(), &[20, 30, 40]);
    }

    #[test]
    fn slice_rejects_range_past_end() {
        let buf = SecureBytes::from_slice(&[1, 2, 3]);
        let err = buf.slice(1..7).unwrap_err();
        assert_eq!(err, CryptoError::OutOfBounds { index: 7, len: 3 });
    }

    #[test]
    fn slice_rejects_inverted_range() {
        let buf = SecureBytes::from_slice(&[1, 2, 3]);
        assert!(buf.slice(2..1).is_err());
    }

    #[test]
    fn split_at_returns_prefix_and_suffix() {
        let buf = SecureBytes::from_slice(&[1, 2, 3, 4]);
        let (prefix, suffix) = buf.split_at(1).unwrap();
        assert_eq!(prefix.as_slice(), &[1]);
        assert_eq!(suffix.as_slice(), &[2, 3, 4]);
    }

    #[test]
    fn split_at_boundaries() {
        let buf = SecureBytes::from_slice(&[1, 2]);

        let (prefix, suffix) = buf.split_at(0).unwrap();
        assert!(prefix.is_empty());
        assert_eq!(suffix.as_slice(), &[1, 2]);

        let (prefix, suffix) = buf.split_at(2).unwrap();
        assert_eq!(prefix.as_slice(), &[1, 2]);
        assert!(suffix.is_empty());
    }

    #[test]
    fn split_at_rejects_position_past_end() {
        let buf = SecureBytes::from_slice(&[1, 2]);
        let err = buf.split_at(3).unwrap_err();
        assert_eq!(err, CryptoError::OutOfBounds { index: 3, len: 2 });
    }

    #[test]
    fn secure_zero_wipes_but_keeps_length() {
        let mut buf = SecureBytes::from_slice(&[0xFF; 16]);
        buf.secure_zero();

        assert_eq!(buf.len(), 16);
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn secure_zero_is_idempotent() {
        let mut buf = SecureBytes::from_slice(&[7, 7, 7]);
        buf.secure_zero();
        buf.secure_zero();
        assert_eq!(buf.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn equality_is_by_content() {
        let a = SecureBytes::from_slice(&[1, 2, 3]);
        let b = SecureBytes::from_slice(&[1, 2, 3]);
        let c = SecureBytes::from_slice(&[1, 2, 4]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn debug_never_prints_content() {
        let buf = SecureBytes::from_slice(b"hunter2");
        let rendered = format!("{buf:?}");
        assert!(rendered.contains("len: 7"));
        assert!(!rendered.contains("hunter2"));
    }
}
