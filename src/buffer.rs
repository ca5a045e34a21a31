//! Growable output buffer shared by the traversal engine and the formatters.

/// Initial capacity of a fresh buffer; enough for typical small documents.
const INITIAL_CAPACITY: usize = 256;

/// An append-only byte buffer owned by a single encode call.
///
/// Growth is geometric (delegated to `Vec`), so appends are amortized O(1).
/// Formatters call [`reserve`](OutputBuffer::reserve) before writes whose
/// worst-case size is known up front.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        OutputBuffer {
            bytes: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Wraps an existing vector; new output is appended after its contents.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        OutputBuffer { bytes }
    }

    #[inline]
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    #[inline]
    pub fn append_literal(&mut self, literal: &'static str) {
        self.bytes.extend_from_slice(literal.as_bytes());
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.bytes.reserve(additional);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Drops everything written after `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Consumes the buffer and hands back the encoded bytes.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_finalize() {
        let mut buf = OutputBuffer::new();
        assert!(buf.is_empty());
        buf.append_literal("null");
        buf.push(b',');
        buf.append_bytes(b"true");
        assert_eq!(buf.len(), 9);
        assert_eq!(buf.finalize(), b"null,true");
    }

    #[test]
    fn test_reserve_keeps_contents() {
        let mut buf = OutputBuffer::from_vec(b"[1".to_vec());
        buf.reserve(4096);
        buf.append_literal("]");
        assert_eq!(buf.as_bytes(), b"[1]");
    }

    #[test]
    fn test_truncate_rolls_back() {
        let mut buf = OutputBuffer::new();
        buf.append_literal("[1,");
        let mark = buf.len();
        buf.append_literal("partial");
        buf.truncate(mark);
        assert_eq!(buf.finalize(), b"[1,");
    }
}
