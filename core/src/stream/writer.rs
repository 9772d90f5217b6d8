//! stream/writer.rs
//! Compressing `Write` adapter: buffers input and emits one frame per
//! full buffer, flush, or close.

use std::io::{self, Write};

use tracing::{trace, warn};

use crate::constants::DEFAULT_STREAM_BUFFER_SIZE;
use crate::session::{Session, SessionConfig};
use crate::stream::framing::write_frame;
use crate::stream::closed_error;

pub struct CompressorWriter<W: Write> {
    inner: Option<W>,
    session: Session,
    buf: Vec<u8>,
    buffer_size: usize,
    scratch: Vec<u8>,
    closed: bool,
}

impl<W: Write> CompressorWriter<W> {
    pub fn new(inner: W, config: SessionConfig) -> io::Result<Self> {
        Self::with_buffer_size(inner, DEFAULT_STREAM_BUFFER_SIZE, config)
    }

    pub fn with_buffer_size(inner: W, buffer_size: usize, config: SessionConfig) -> io::Result<Self> {
        if buffer_size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer size must be positive"));
        }
        let session = Session::new(config)?;
        Self::with_session(inner, buffer_size, session)
    }

    /// Take ownership of an existing session; it is ended on close.
    pub fn with_session(inner: W, buffer_size: usize, session: Session) -> io::Result<Self> {
        if buffer_size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "buffer size must be positive"));
        }
        let bound = session.max_compressed_length(buffer_size)?;
        Ok(Self {
            inner: Some(inner),
            session,
            buf: Vec::with_capacity(buffer_size),
            buffer_size,
            scratch: vec![0u8; bound],
            closed: false,
        })
    }

    pub fn get_ref(&self) -> &W {
        match &self.inner {
            Some(w) => w,
            None => unreachable!("sink is only taken by into_inner"),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close the stream and hand back the sink.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.close()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "sink already taken"))
    }

    fn emit_frame(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let n = self.session.compress(&self.buf, &mut self.scratch)?;
        let sink = self
            .inner
            .as_mut()
            .ok_or_else(closed_error)?;
        write_frame(sink, &self.scratch[..n])?;
        self.session.counters_mut().add_frame_written();
        trace!(handle = %self.session.handle(), len = self.buf.len(), compressed = n, "frame written");
        self.buf.clear();
        Ok(())
    }

    /// Flush buffered bytes, end the session and flush the sink. Idempotent.
    /// The session is ended and the stream marked closed even when flushing fails.
    pub fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        let flushed = self.flush();
        self.closed = true;
        let ended = self.session.end();
        flushed?;
        ended?;
        Ok(())
    }
}

impl<W: Write> Write for CompressorWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(closed_error());
        }
        let mut rest = data;
        while !rest.is_empty() {
            let room = self.buffer_size - self.buf.len();
            let take = room.min(rest.len());
            self.buf.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.buf.len() == self.buffer_size {
                self.emit_frame()?;
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.closed {
            return Err(closed_error());
        }
        self.emit_frame()?;
        match self.inner.as_mut() {
            Some(w) => w.flush(),
            None => Err(closed_error()),
        }
    }
}

impl<W: Write> Drop for CompressorWriter<W> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                warn!(error = %e, "compressor stream close on drop failed");
            }
        }
    }
}
