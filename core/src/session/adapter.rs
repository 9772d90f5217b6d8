//! session/adapter.rs
//! Normalises caller buffers into validated engine calls.
//!
//! Slices are pinned views and go to the engine as-is. Direct `ByteBuffer`s
//! go zero-copy too, read-only or not; heap buffers are staged through
//! scratch buffers from the session pool and returned after the call.

use crate::buffer::ByteBuffer;
use crate::codec::{Direction, NativeStatus, Transfer};
use crate::native::{BufferPool, NativeBuffer, NativeContext};
use crate::telemetry::{SessionCounters, Stage, TelemetryTimer};
use crate::types::{QatError, Result};

/// Validated window over one caller buffer, built per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView {
    pub offset: usize,
    pub length: usize,
    pub read_only: bool,
    pub direct: bool,
}

impl BufferView {
    /// Window `[offset, offset + length)` over a slice of `capacity` bytes.
    pub fn of_slice(what: &'static str, capacity: usize, offset: usize, length: usize) -> Result<Self> {
        match offset.checked_add(length) {
            Some(end) if end <= capacity => Ok(Self { offset, length, read_only: false, direct: true }),
            _ => Err(QatError::Bounds { what, offset, length, capacity }),
        }
    }

    pub fn of_buffer(buf: &ByteBuffer) -> Self {
        Self {
            offset: buf.position(),
            length: buf.remaining(),
            read_only: buf.is_read_only(),
            direct: buf.is_direct(),
        }
    }

    /// Direct memory goes to the engine as-is. A read-only view still
    /// qualifies as a source; read-only destinations never get this far.
    pub fn is_zero_copy(&self) -> bool {
        self.direct
    }
}

/// Map an engine status onto the caller-facing error.
pub(crate) fn status_error(status: NativeStatus, available: usize) -> QatError {
    match status {
        NativeStatus::BufferError { needed } => QatError::InsufficientOutput { needed, available },
        other => QatError::Native(other),
    }
}

/// Argument checks for slice windows: empty arguments first, then bounds.
pub(crate) fn check_slices(
    src_cap: usize,
    src_offset: usize,
    src_len: usize,
    dst_cap: usize,
    dst_offset: usize,
    dst_len: usize,
) -> Result<(BufferView, BufferView)> {
    if src_len == 0 {
        return Err(QatError::invalid("source length is zero"));
    }
    if dst_cap == 0 || dst_len == 0 {
        return Err(QatError::invalid("destination length is zero"));
    }
    let src = BufferView::of_slice("source", src_cap, src_offset, src_len)?;
    let dst = BufferView::of_slice("destination", dst_cap, dst_offset, dst_len)?;
    Ok((src, dst))
}

/// Buffer checks: empty windows first, then destination writability.
pub(crate) fn check_buffers(src: &ByteBuffer, dst: &ByteBuffer) -> Result<(BufferView, BufferView)> {
    let sv = BufferView::of_buffer(src);
    let dv = BufferView::of_buffer(dst);
    if sv.length == 0 {
        return Err(QatError::invalid("source buffer has no remaining bytes"));
    }
    if dv.length == 0 {
        return Err(QatError::invalid("destination buffer has no remaining space"));
    }
    if dv.read_only {
        return Err(QatError::ReadOnlyBuffer);
    }
    Ok((sv, dv))
}

fn stage_in(pool: &mut BufferPool, data: &[u8]) -> Result<NativeBuffer> {
    let mut buf = pool.checkout(data.len())?;
    if let Err(e) = buf.copy_in(data) {
        pool.checkin(buf)?;
        return Err(e.into());
    }
    Ok(buf)
}

/// Run one engine call over two buffers and advance their positions by the
/// bytes consumed and produced. Limits never change.
pub(crate) fn transfer_buffers(
    ctx: &mut NativeContext,
    pool: &mut BufferPool,
    counters: &mut SessionCounters,
    timer: &mut TelemetryTimer,
    direction: Direction,
    src: &mut ByteBuffer,
    dst: &mut ByteBuffer,
) -> Result<Transfer> {
    let (sv, dv) = check_buffers(src, dst)?;

    let src_stage = if sv.is_zero_copy() {
        None
    } else {
        let buf = timer.time(Stage::Staging, || stage_in(pool, src.window()))?;
        counters.add_staged(sv.length);
        Some(buf)
    };
    let mut dst_stage = if dv.is_zero_copy() {
        None
    } else {
        match pool.checkout(dv.length) {
            Ok(buf) => Some(buf),
            Err(e) => {
                if let Some(buf) = src_stage {
                    pool.checkin(buf)?;
                }
                return Err(e.into());
            }
        }
    };

    let stage = match direction {
        Direction::Compress => Stage::Compress,
        Direction::Decompress => Stage::Decompress,
    };
    let outcome = timer.time(stage, || {
        let input: &[u8] = match &src_stage {
            Some(buf) => &buf.as_slice()[..sv.length],
            None => src.window(),
        };
        let output: &mut [u8] = match dst_stage.as_mut() {
            Some(buf) => &mut buf.as_mut_slice()[..dv.length],
            None => dst.window_mut()?,
        };
        ctx.run(direction, input, output, counters)
            .map_err(|status| status_error(status, dv.length))
    });

    let outcome = outcome.and_then(|t| {
        if let Some(buf) = &dst_stage {
            timer.time(Stage::Staging, || buf.copy_out(t.produced, dst.window_mut()?).map_err(QatError::from))?;
            counters.add_staged(t.produced);
        }
        Ok(t)
    });

    let returned_src = src_stage.map_or(Ok(()), |buf| pool.checkin(buf));
    let returned_dst = dst_stage.map_or(Ok(()), |buf| pool.checkin(buf));
    let t = outcome?;
    returned_src?;
    returned_dst?;

    src.advance(t.consumed);
    dst.advance(t.produced);
    Ok(t)
}
