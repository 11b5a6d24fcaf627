use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, error};

/// Capacity-bounded buffer for captured child output.
///
/// Appends are strictly arrival-ordered. On overflow the oldest bytes are
/// evicted so a chatty child cannot grow memory without bound; `take`
/// drains everything buffered so far, which is how `consume` polling avoids
/// returning duplicate data.
pub struct CaptureBuffer {
    buffer: VecDeque<u8>,
    capacity: usize,
}

impl CaptureBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "CaptureBuffer capacity must be non-zero");
        Self {
            buffer: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append bytes, evicting the oldest data if the chunk overflows the
    /// capacity.
    pub fn push(&mut self, data: &[u8]) {
        if data.len() >= self.capacity {
            // The chunk alone fills the buffer; keep only its tail.
            self.buffer.clear();
            self.buffer.extend(&data[data.len() - self.capacity..]);
            return;
        }
        let overflow = (self.buffer.len() + data.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.buffer.drain(..overflow);
        }
        self.buffer.extend(data);
    }

    /// Copy of everything buffered so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.iter().copied().collect()
    }

    /// Drain and return everything buffered so far.
    pub fn take(&mut self) -> Vec<u8> {
        self.buffer.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Shared handle to one stream's capture buffer.
pub type SharedCapture = Arc<Mutex<CaptureBuffer>>;

pub fn shared_capture(capacity: usize) -> SharedCapture {
    Arc::new(Mutex::new(CaptureBuffer::new(capacity)))
}

/// Lock a capture buffer, recovering from a poisoned lock by clearing the
/// possibly-torn contents rather than propagating the panic.
pub(crate) fn lock_capture(capture: &SharedCapture) -> std::sync::MutexGuard<'_, CaptureBuffer> {
    match capture.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!(
                event = "core.process.capture_lock_poisoned",
                "Mutex poisoned, clearing capture buffer to avoid corrupt data"
            );
            let mut guard = poisoned.into_inner();
            guard.clear();
            guard
        }
    }
}

/// Spawn a task that drains a child stream into a shared buffer.
///
/// The task exits when the stream reaches EOF (child exited and the pipe
/// drained) or on a read error. Dropping the returned handle detaches the
/// task; it keeps feeding the buffer for as long as the stream lives.
pub fn spawn_stream_reader<R>(
    id: String,
    stream_name: &'static str,
    mut stream: R,
    capture: SharedCapture,
) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => {
                    debug!(
                        event = "core.process.stream_eof",
                        id = %id,
                        stream = stream_name,
                    );
                    break;
                }
                Ok(n) => {
                    lock_capture(&capture).push(&buf[..n]);
                }
                Err(e) => {
                    error!(
                        event = "core.process.stream_read_error",
                        id = %id,
                        stream = stream_name,
                        error = %e,
                    );
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_buffer_basic() {
        let mut buf = CaptureBuffer::new(10);
        assert!(buf.is_empty());

        buf.push(b"hello");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.contents(), b"hello");
    }

    #[test]
    fn test_capture_buffer_overflow_keeps_tail() {
        let mut buf = CaptureBuffer::new(5);
        buf.push(b"hello world");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.contents(), b"world");
    }

    #[test]
    fn test_capture_buffer_incremental_overflow() {
        let mut buf = CaptureBuffer::new(5);
        buf.push(b"abc");
        buf.push(b"def");
        // "abcdef" bounded to the last 5 bytes
        assert_eq!(buf.contents(), b"bcdef");
    }

    #[test]
    fn test_capture_buffer_take_drains() {
        let mut buf = CaptureBuffer::new(16);
        buf.push(b"first");
        assert_eq!(buf.take(), b"first");
        assert!(buf.is_empty());

        buf.push(b"second");
        assert_eq!(buf.take(), b"second");
    }

    #[test]
    fn test_capture_buffer_exact_capacity() {
        let mut buf = CaptureBuffer::new(5);
        buf.push(b"12345");
        assert_eq!(buf.contents(), b"12345");
    }

    #[test]
    #[should_panic(expected = "CaptureBuffer capacity must be non-zero")]
    fn test_capture_buffer_zero_capacity_panics() {
        CaptureBuffer::new(0);
    }

    #[tokio::test]
    async fn test_stream_reader_captures_until_eof() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let capture = shared_capture(1024);
        let handle = spawn_stream_reader("t1".to_string(), "stdout", reader, capture.clone());

        use tokio::io::AsyncWriteExt;
        writer.write_all(b"chunk one ").await.unwrap();
        writer.write_all(b"chunk two").await.unwrap();
        drop(writer); // EOF

        handle.await.unwrap();
        assert_eq!(lock_capture(&capture).contents(), b"chunk one chunk two");
    }

    #[tokio::test]
    async fn test_stream_reader_respects_capacity() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let capture = shared_capture(4);
        let handle = spawn_stream_reader("t2".to_string(), "stderr", reader, capture.clone());

        use tokio::io::AsyncWriteExt;
        writer.write_all(b"abcdefgh").await.unwrap();
        drop(writer);

        handle.await.unwrap();
        assert_eq!(lock_capture(&capture).contents(), b"efgh");
    }
}
