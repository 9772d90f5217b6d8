//! stream/reader.rs
//! Decompressing `Read` adapter: pulls one frame at a time and serves
//! reads from the decompressed result.

use std::io::{self, ErrorKind, Read};

use tracing::{trace, warn};

use crate::constants::{DEFAULT_STREAM_BUFFER_SIZE, MAX_CHUNK_SIZE};
use crate::session::{Session, SessionConfig};
use crate::stream::closed_error;
use crate::stream::framing::{read_frame_len, read_frame_payload, FrameError};
use crate::types::QatError;

pub struct DecompressorReader<R: Read> {
    inner: R,
    session: Session,
    frame: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
    out_len: usize,
    max_frame: usize,
    eof: bool,
    closed: bool,
}

impl<R: Read> DecompressorReader<R> {
    pub fn new(inner: R, config: SessionConfig) -> io::Result<Self> {
        Self::with_buffer_size(inner, DEFAULT_STREAM_BUFFER_SIZE, config)
    }

    pub fn with_buffer_size(inner: R, buffer_size: usize, config: SessionConfig) -> io::Result<Self> {
        if buffer_size == 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "buffer size must be positive"));
        }
        let session = Session::new(config)?;
        Self::with_session(inner, buffer_size, session)
    }

    /// Take ownership of an existing session; it is ended on close.
    pub fn with_session(inner: R, buffer_size: usize, session: Session) -> io::Result<Self> {
        if buffer_size == 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "buffer size must be positive"));
        }
        let max_frame = session.max_compressed_length(MAX_CHUNK_SIZE)?;
        Ok(Self {
            inner,
            session,
            frame: Vec::new(),
            out: vec![0u8; buffer_size.min(MAX_CHUNK_SIZE)],
            out_pos: 0,
            out_len: 0,
            max_frame,
            eof: false,
            closed: false,
        })
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        Ok(())
    }

    /// Make decompressed bytes available. `false` means end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        while self.out_pos == self.out_len {
            if self.eof {
                return Ok(false);
            }
            let len = match read_frame_len(&mut self.inner)? {
                None => {
                    self.eof = true;
                    return Ok(false);
                }
                Some(0) => continue,
                Some(len) => len,
            };
            if len > self.max_frame {
                return Err(FrameError::TooLarge { len, max: self.max_frame }.into());
            }
            read_frame_payload(&mut self.inner, len, &mut self.frame)?;
            self.decompress_frame()?;
            self.session.counters_mut().add_frame_read();
            trace!(handle = %self.session.handle(), len, decompressed = self.out_len, "frame read");
        }
        Ok(true)
    }

    /// Decompress the current frame, doubling the result buffer on
    /// insufficient output up to the chunk limit.
    fn decompress_frame(&mut self) -> io::Result<()> {
        loop {
            match self.session.decompress(&self.frame, &mut self.out) {
                Ok(n) => {
                    self.out_pos = 0;
                    self.out_len = n;
                    return Ok(());
                }
                Err(QatError::InsufficientOutput { needed, .. }) => {
                    if self.out.len() >= MAX_CHUNK_SIZE {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            format!("decompressed frame exceeds {} bytes", MAX_CHUNK_SIZE),
                        ));
                    }
                    let grown = needed.unwrap_or(0).max(self.out.len() * 2).min(MAX_CHUNK_SIZE);
                    self.out.resize(grown, 0);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Decompressed bytes ready without touching the source.
    pub fn available(&self) -> io::Result<usize> {
        self.ensure_open()?;
        Ok(self.out_len - self.out_pos)
    }

    /// Discard up to `n` decompressed bytes; negative `n` skips nothing.
    pub fn skip(&mut self, n: i64) -> io::Result<u64> {
        self.ensure_open()?;
        if n <= 0 {
            return Ok(0);
        }
        let mut left = n as u64;
        let mut skipped = 0u64;
        while left > 0 && self.fill()? {
            let ready = (self.out_len - self.out_pos) as u64;
            let take = ready.min(left);
            self.out_pos += take as usize;
            left -= take;
            skipped += take;
        }
        Ok(skipped)
    }

    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.ensure_open()?;
        if !self.fill()? {
            return Ok(None);
        }
        let b = self.out[self.out_pos];
        self.out_pos += 1;
        Ok(Some(b))
    }

    pub fn mark_supported(&self) -> bool {
        false
    }

    pub fn mark(&mut self, _read_limit: usize) {}

    pub fn reset(&mut self) -> io::Result<()> {
        Err(io::Error::new(ErrorKind::Other, "mark/reset not supported"))
    }

    /// End the session. Idempotent.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.out_pos = 0;
        self.out_len = 0;
        self.session.end()?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<R: Read> Read for DecompressorReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.ensure_open()?;
        if buf.is_empty() || !self.fill()? {
            return Ok(0);
        }
        let n = buf.len().min(self.out_len - self.out_pos);
        buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}

impl<R: Read> Drop for DecompressorReader<R> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "decompressor stream close on drop failed");
        }
    }
}
