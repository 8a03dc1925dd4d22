//! Byte buffer shared by the request and response sides of an exchange.

use crate::error::{ClientError, Result};

/// Upper bound on the bytes a single command or response may occupy.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Growable byte container holding one wire command or one response.
///
/// A buffer lives for a single request/response pair; [`reset`](Self::reset)
/// returns it to the empty state for reuse.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    data: Vec<u8>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the buffered bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes currently buffered.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop all content. Never fails.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Append bytes to the tail.
    ///
    /// If the result would exceed [`MAX_BUFFER_SIZE`] the buffer is left
    /// exactly as it was and [`ClientError::BufferTooBig`] is returned.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_BUFFER_SIZE - self.data.len() {
            return Err(ClientError::BufferTooBig);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Replace the content with `s` followed by a single NUL terminator,
    /// the wire form of a request payload. Fails like [`append`](Self::append).
    pub fn copy_string(&mut self, s: &str) -> Result<()> {
        self.reset();
        if s.len() >= MAX_BUFFER_SIZE {
            return Err(ClientError::BufferTooBig);
        }
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        Ok(())
    }

    /// Strip trailing NUL padding left by block-granular responses.
    pub fn sanitize(&mut self) {
        while self.data.last() == Some(&0) {
            self.data.pop();
        }
    }
}

impl From<Vec<u8>> for CommandBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_empty() {
        let buffer = CommandBuffer::new();
        assert_eq!(buffer.size(), 0);
        assert!(buffer.is_empty());
        assert_eq!(buffer.data(), b"");
    }

    #[test]
    fn append_reproduces_bytes_exactly() {
        let mut buffer = CommandBuffer::new();
        buffer.append(b"hello ").unwrap();
        buffer.append(b"world").unwrap();
        assert_eq!(buffer.data(), b"hello world");
        assert_eq!(buffer.size(), 11);
    }

    #[test]
    fn reset_always_yields_empty() {
        let mut buffer = CommandBuffer::new();
        buffer.append(b"some data").unwrap();
        buffer.reset();
        assert_eq!(buffer.size(), 0);
        buffer.reset();
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn oversized_append_leaves_buffer_unchanged() {
        let mut buffer = CommandBuffer::new();
        buffer.append(b"prior content").unwrap();

        let huge = vec![0u8; MAX_BUFFER_SIZE];
        let err = buffer.append(&huge).unwrap_err();
        assert!(matches!(err, ClientError::BufferTooBig));
        assert_eq!(buffer.data(), b"prior content");
        assert_eq!(buffer.size(), 13);
    }

    #[test]
    fn append_up_to_the_bound_succeeds() {
        let mut buffer = CommandBuffer::new();
        buffer.append(&vec![0u8; MAX_BUFFER_SIZE]).unwrap();
        assert_eq!(buffer.size(), MAX_BUFFER_SIZE);
        assert!(matches!(
            buffer.append(b"x").unwrap_err(),
            ClientError::BufferTooBig
        ));
    }

    #[test]
    fn copy_string_is_nul_terminated() {
        let mut buffer = CommandBuffer::new();
        buffer.append(b"stale").unwrap();
        buffer.copy_string("abc").unwrap();
        assert_eq!(buffer.data(), b"abc\0");
        assert_eq!(buffer.size(), 4);
    }

    #[test]
    fn sanitize_strips_trailing_padding() {
        let mut buffer = CommandBuffer::from(b"{\"a\":1}\0\0\0".to_vec());
        buffer.sanitize();
        assert_eq!(buffer.data(), b"{\"a\":1}");

        // Interior NULs are content, not padding.
        let mut buffer = CommandBuffer::from(b"a\0b".to_vec());
        buffer.sanitize();
        assert_eq!(buffer.data(), b"a\0b");
    }
}
