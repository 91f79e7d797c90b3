//! Immutable byte blobs (`@bytes` on the wire)

use std::fmt;

/// An immutable sequence of bytes
///
/// The buffer is owned and never handed out mutably: [`Bytes::as_slice`]
/// lends a shared view and [`Bytes::to_vec`] returns an independent copy, so
/// two holders of the same value can never observe each other's writes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes(Box<[u8]>);

impl Bytes {
    /// Copy `bytes` into a new blob
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Bytes(bytes.as_ref().into())
    }

    /// Borrow the content
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Copy the content out
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Number of bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the blob holds no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v.into_boxed_slice())
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Bytes::new(v)
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(v: [u8; N]) -> Self {
        Bytes::new(v)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bytes(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "0x{:02x}", b)?;
        }
        f.write_str(")")
    }
}
