//! Connection handling dengan buffered I/O
//!
//! Stream non-blocking, dipakai dari event loop mio (edge-triggered):
//! read dan write harus dikuras sampai `WouldBlock`.

use std::io::{self, Read, Write};

/// Initial buffer sizes - tuned untuk typical message sizes
const READ_BUFFER_SIZE: usize = 64 * 1024; // 64KB
const WRITE_BUFFER_SIZE: usize = 64 * 1024; // 64KB

/// Socket send/receive buffer request (best effort)
#[cfg(unix)]
const SOCKET_BUFFER_SIZE: libc::c_int = 256 * 1024; // 256KB

/// Buffered connection over a non-blocking stream
pub struct Connection<S> {
    stream: S,
    read_buffer: Vec<u8>,
    write_buffer: Vec<u8>,
    read_pos: usize,
    read_len: usize,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            read_buffer: vec![0u8; READ_BUFFER_SIZE],
            write_buffer: Vec::with_capacity(WRITE_BUFFER_SIZE),
            read_pos: 0,
            read_len: 0,
        }
    }

    /// Read semua data yang tersedia ke internal buffer
    ///
    /// Returns `true` jika peer sudah menutup koneksi (EOF). Data yang
    /// terbaca sebelum EOF tetap tersedia lewat `readable()`.
    pub fn fill_read_buffer(&mut self) -> io::Result<bool> {
        // Compact buffer jika perlu
        if self.read_pos > 0 {
            self.read_buffer.copy_within(self.read_pos..self.read_len, 0);
            self.read_len -= self.read_pos;
            self.read_pos = 0;
        }

        loop {
            if self.read_len == self.read_buffer.len() {
                // Envelope besar: grow buffer
                let new_len = self.read_buffer.len() * 2;
                self.read_buffer.resize(new_len, 0);
            }

            match self.stream.read(&mut self.read_buffer[self.read_len..]) {
                Ok(0) => return Ok(true),
                Ok(n) => self.read_len += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Get readable data slice (zero-copy)
    #[inline(always)]
    pub fn readable(&self) -> &[u8] {
        &self.read_buffer[self.read_pos..self.read_len]
    }

    /// Consume n bytes dari read buffer
    #[inline(always)]
    pub fn consume(&mut self, n: usize) {
        self.read_pos += n.min(self.read_len - self.read_pos);
    }

    /// Queue data untuk write
    #[inline]
    pub fn queue_write(&mut self, data: &[u8]) {
        self.write_buffer.extend_from_slice(data);
    }

    /// Flush write buffer ke socket
    ///
    /// Berhenti di `WouldBlock`; sisa data dikirim saat event writable berikutnya.
    pub fn flush_write_buffer(&mut self) -> io::Result<()> {
        let mut written = 0;
        let result = loop {
            if written == self.write_buffer.len() {
                break Ok(());
            }
            match self.stream.write(&self.write_buffer[written..]) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "Failed to write to socket",
                    ));
                }
                Ok(n) => written += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(()),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        self.write_buffer.drain(..written);
        result
    }

    /// Bytes pending in write buffer
    #[inline(always)]
    pub fn write_pending(&self) -> usize {
        self.write_buffer.len()
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}

/// Enlarge kernel socket buffers. Errors are ignored, not all platforms
/// allow it.
#[cfg(unix)]
pub fn tune_socket_buffers(stream: &std::net::TcpStream) {
    use std::os::unix::io::AsRawFd;

    let fd = stream.as_raw_fd();
    let optval = SOCKET_BUFFER_SIZE;
    for opt in [libc::SO_SNDBUF, libc::SO_RCVBUF] {
        // SAFETY: fd is a live socket owned by `stream`, optval outlives the call
        unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                opt,
                &optval as *const _ as *const libc::c_void,
                std::mem::size_of::<libc::c_int>() as libc::socklen_t,
            );
        }
    }
}

#[cfg(not(unix))]
pub fn tune_socket_buffers(_stream: &std::net::TcpStream) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory stream: reads from a script, writes accept at most `chunk` bytes
    struct ScriptedStream {
        reads: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
        chunk: usize,
        write_budget: usize,
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(data.len())
                }
                Some(Err(e)) => Err(e),
                None => Err(io::ErrorKind::WouldBlock.into()),
            }
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.write_budget == 0 {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let n = buf.len().min(self.chunk).min(self.write_budget);
            self.write_budget -= n;
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn stream(reads: Vec<io::Result<Vec<u8>>>, write_budget: usize) -> ScriptedStream {
        ScriptedStream {
            reads: reads.into(),
            written: Vec::new(),
            chunk: 3,
            write_budget,
        }
    }

    #[test]
    fn test_reads_until_would_block() {
        let mut conn = Connection::new(stream(vec![Ok(vec![1, 2]), Ok(vec![3])], 0));
        assert!(!conn.fill_read_buffer().unwrap());
        assert_eq!(conn.readable(), &[1, 2, 3]);

        conn.consume(2);
        assert_eq!(conn.readable(), &[3]);
    }

    #[test]
    fn test_eof_keeps_buffered_data() {
        let mut conn = Connection::new(stream(vec![Ok(vec![9]), Ok(vec![])], 0));
        assert!(conn.fill_read_buffer().unwrap());
        assert_eq!(conn.readable(), &[9]);
    }

    #[test]
    fn test_partial_flush_keeps_remainder() {
        let mut conn = Connection::new(stream(vec![], 4));
        conn.queue_write(&[1, 2, 3, 4, 5, 6]);
        conn.flush_write_buffer().unwrap();
        assert_eq!(conn.write_pending(), 2);

        conn.stream_mut().write_budget = 10;
        conn.flush_write_buffer().unwrap();
        assert_eq!(conn.write_pending(), 0);
        assert_eq!(conn.stream_mut().written, vec![1, 2, 3, 4, 5, 6]);
    }
}
