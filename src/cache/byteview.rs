//! Byte View Module
//!
//! Immutable snapshot of a cached value's bytes.

use std::fmt;

use bytes::Bytes;

// == Byte View ==
/// An immutable, independently owned view over a cached value.
///
/// Construction always copies the input, and [`ByteView::to_vec`] always
/// hands out a fresh copy, so nothing a caller does to the bytes it holds
/// can reach the copy kept in the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view holding a private copy of `data`.
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == To Vec ==
    /// Returns a fresh copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    // == As Slice ==
    /// Borrows the bytes read-only.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    // == To String Lossy ==
    /// Converts the bytes to a string, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(data: Vec<u8>) -> Self {
        Self::new(&data)
    }
}

impl From<&[u8]> for ByteView {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl From<&str> for ByteView {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(data: String) -> Self {
        Self::new(data.as_bytes())
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
