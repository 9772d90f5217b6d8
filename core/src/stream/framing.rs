//! stream/framing.rs
//! Chunk framing for the compressed stream.
//!
//! Layout, repeated until EOF (no magic, no trailer):
//!
//! ```text
//! [ payload_len (4, big-endian) ]
//! [ payload     (payload_len)   ]
//! ```

use std::io::{self, ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use thiserror::Error;

use crate::constants::FRAME_HEADER_LEN;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("stream ended inside a frame {0}")]
    Truncated(&'static str),
    #[error("frame length {len} exceeds limit {max}")]
    TooLarge { len: usize, max: usize },
    #[error("frame payload of {0} bytes does not fit a u32 length")]
    Unrepresentable(usize),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<FrameError> for io::Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(inner) => inner,
            FrameError::Truncated(_) => io::Error::new(ErrorKind::UnexpectedEof, e),
            FrameError::TooLarge { .. } => io::Error::new(ErrorKind::InvalidData, e),
            FrameError::Unrepresentable(_) => io::Error::new(ErrorKind::InvalidInput, e),
        }
    }
}

/// Encode one frame into canonical wire bytes.
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::Unrepresentable(payload.len()))?;
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    out.write_u32::<BigEndian>(len)?;
    out.extend_from_slice(payload);
    Ok(out)
}

/// Write one frame to `w`.
pub fn write_frame<W: Write>(w: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::Unrepresentable(payload.len()))?;
    w.write_u32::<BigEndian>(len)?;
    w.write_all(payload)?;
    Ok(())
}

/// Split the first frame off `wire` without copying.
/// Returns the payload and the bytes after it.
pub fn decode_frame(wire: &[u8]) -> Result<(&[u8], &[u8]), FrameError> {
    if wire.len() < FRAME_HEADER_LEN {
        return Err(FrameError::Truncated("header"));
    }
    let len = BigEndian::read_u32(&wire[..FRAME_HEADER_LEN]) as usize;
    let body = &wire[FRAME_HEADER_LEN..];
    if body.len() < len {
        return Err(FrameError::Truncated("payload"));
    }
    Ok(body.split_at(len))
}

/// Read the next frame length. `None` means EOF on a frame boundary.
pub fn read_frame_len<R: Read>(r: &mut R) -> Result<Option<usize>, FrameError> {
    let mut hdr = [0u8; FRAME_HEADER_LEN];
    let mut filled = 0;
    while filled < FRAME_HEADER_LEN {
        match r.read(&mut hdr[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(FrameError::Truncated("header")),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(BigEndian::read_u32(&hdr) as usize))
}

/// Read exactly `len` payload bytes into `buf` (resized to `len`).
pub fn read_frame_payload<R: Read>(r: &mut R, len: usize, buf: &mut Vec<u8>) -> Result<(), FrameError> {
    buf.clear();
    buf.resize(len, 0);
    r.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => FrameError::Truncated("payload"),
        _ => FrameError::Io(e),
    })
}
