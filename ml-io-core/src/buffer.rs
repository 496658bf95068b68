//! In-memory byte-stream backends
//!
//! [`VectorSink`] appends to a growable buffer shared with the caller and
//! [`BufferView`] reads from a borrowed slice without copying it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::io::{Reader, Writer};

/// Growable byte buffer shared between a [`VectorSink`] and its owner
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    /// The bytes, guarded so the owner can inspect them while a sink is alive
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Create an empty shared buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing bytes; sinks append after them
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bytes)),
        }
    }

    /// Lock the buffer for inspection
    pub fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A poisoned lock still guards a valid vector
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current length in bytes
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the current contents out
    pub fn to_vec(&self) -> Vec<u8> {
        self.lock().clone()
    }
}

/// Writer that appends every call to a [`SharedBuffer`]
#[derive(Debug)]
pub struct VectorSink {
    /// Destination buffer
    buffer: SharedBuffer,
}

impl VectorSink {
    /// Create a sink appending to `buffer`
    pub fn new(buffer: SharedBuffer) -> Self {
        Self { buffer }
    }

    /// The buffer this sink appends to
    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }
}

impl Writer for VectorSink {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut bytes = self.buffer.lock();
        bytes.reserve(buf.len());
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Resettable reader over borrowed memory
#[derive(Debug, Clone)]
pub struct BufferView<'a> {
    /// The borrowed region
    data: &'a [u8],

    /// Offset of the next byte to read
    cursor: usize,
}

impl<'a> BufferView<'a> {
    /// Create a view positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Bytes left before the end of the view
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Copy the next bytes into `buf` and advance
    pub fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        if n == 0 {
            return 0;
        }

        buf[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        n
    }

    /// Move the cursor back to the start
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl Reader for BufferView<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.read_into(buf))
    }

    fn is_resettable(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<()> {
        self.rewind();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{ReaderExt, WriterExt};
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_short_read_then_end() {
        let data = b"hello world";
        let mut view = BufferView::new(data);
        let mut buf = [0u8; 32];

        assert_eq!(view.read(&mut buf).unwrap(), data.len());
        assert_eq!(&buf[..data.len()], data);
        assert_eq!(view.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_zero_length_read_keeps_cursor() {
        let mut view = BufferView::new(b"abc");
        let mut one = [0u8; 1];
        view.read(&mut one).unwrap();

        assert_eq!(view.read(&mut []).unwrap(), 0);
        assert_eq!(view.position(), 1);
    }

    #[test]
    fn test_reset_replays_bytes() {
        let data: Vec<u8> = (0u8..=255).collect();
        let mut view = BufferView::new(&data);
        assert!(view.is_resettable());

        let mut first = Vec::new();
        view.read_to_end(&mut first).unwrap();
        view.reset().unwrap();
        let mut second = Vec::new();
        view.read_to_end(&mut second).unwrap();

        assert_eq!(first, data);
        assert_eq!(second, data);
    }

    #[test]
    fn test_empty_view() {
        let mut view = BufferView::new(&[]);
        let mut buf = [0u8; 4];
        assert_eq!(view.read(&mut buf).unwrap(), 0);
        assert_eq!(view.remaining(), 0);
    }

    #[test_case(&[] ; "no writes")]
    #[test_case(&[1] ; "single byte")]
    #[test_case(&[3, 0, 5, 1024] ; "mixed sizes")]
    fn test_vector_sink_accumulates(counts: &[usize]) {
        let shared = SharedBuffer::from_vec(b"head".to_vec());
        let mut sink = VectorSink::new(shared.clone());

        let mut expected = b"head".to_vec();
        for (i, &count) in counts.iter().enumerate() {
            let chunk = vec![i as u8; count];
            assert_eq!(sink.write(&chunk).unwrap(), count);
            expected.extend_from_slice(&chunk);
        }

        assert_eq!(shared.len(), 4 + counts.iter().sum::<usize>());
        assert_eq!(shared.to_vec(), expected);
    }

    proptest! {
        #[test]
        fn prop_sink_then_view_round_trip(
            data in proptest::collection::vec(any::<u8>(), 0..4096),
            write_chunk in 1usize..512,
            read_chunk in 1usize..512,
        ) {
            let shared = SharedBuffer::new();
            let mut sink = VectorSink::new(shared.clone());
            for chunk in data.chunks(write_chunk) {
                sink.write_all(chunk).unwrap();
            }

            let stored = shared.to_vec();
            let mut view = BufferView::new(&stored);
            let mut out = Vec::new();
            let mut buf = vec![0u8; read_chunk];
            loop {
                let n = view.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&buf[..n]);
            }

            prop_assert_eq!(out, data);
        }
    }
}
