//! session/core.rs
//! Session lifecycle: one native context from setup to teardown.
//!
//! `Created -> Active` on successful setup, `Active -> Ended` on `end()` or
//! drop. Every call other than `end()` and the config getters fails with
//! `SessionEnded` once the session has ended.

use tracing::{debug, warn};

use crate::buffer::ByteBuffer;
use crate::codec::{
    detect, registry, Accelerator, Algorithm, DataFormat, Direction, HardwareBufferSize, Mode, PollingMode,
};
use crate::native::{BufferPool, ContextHandle, NativeContext};
use crate::session::adapter::{check_slices, status_error, transfer_buffers};
use crate::session::config::SessionConfig;
use crate::telemetry::{SessionCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::{QatError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Active,
    Ended,
}

pub struct Session {
    config: SessionConfig,
    state: SessionState,
    handle: ContextHandle,
    context: Option<NativeContext>,
    pool: BufferPool,
    bytes_read: usize,
    bytes_written: usize,
    counters: SessionCounters,
    timer: TelemetryTimer,
}

impl Session {
    /// Validate `config` and set up an engine. The host is checked for an
    /// accelerator; AUTO mode settles for software when none is found.
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::open(config, detect())
    }

    /// Like [`Session::new`] with an explicit device.
    pub fn with_accelerator(config: SessionConfig, accelerator: Box<dyn Accelerator>) -> Result<Self> {
        Self::open(config, Some(accelerator))
    }

    fn open(config: SessionConfig, accelerator: Option<Box<dyn Accelerator>>) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            config,
            state: SessionState::Created,
            handle: ContextHandle::next(),
            context: None,
            pool: BufferPool::new(),
            bytes_read: 0,
            bytes_written: 0,
            counters: SessionCounters::default(),
            timer: TelemetryTimer::new(),
        };

        let handle = session.handle;
        let params = config.codec_params();
        let context = session.timer.time(Stage::Setup, || {
            NativeContext::setup(handle, params, config.mode, config.retry_count, accelerator)
        })?;
        session.context = Some(context);
        session.state = SessionState::Active;
        debug!(%handle, algorithm = %config.algorithm, mode = ?config.mode, "session active");
        Ok(session)
    }

    fn context_mut(&mut self) -> Result<&mut NativeContext> {
        match self.state {
            SessionState::Active => self.context.as_mut().ok_or(QatError::SessionEnded),
            _ => Err(QatError::SessionEnded),
        }
    }

    fn context_ref(&self) -> Result<&NativeContext> {
        match self.state {
            SessionState::Active => self.context.as_ref().ok_or(QatError::SessionEnded),
            _ => Err(QatError::SessionEnded),
        }
    }

    /// Compress all of `src` into `dst`; returns the compressed length.
    pub fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let (src_len, dst_len) = (src.len(), dst.len());
        self.compress_range(src, 0, src_len, dst, 0, dst_len)
    }

    pub fn compress_range(
        &mut self,
        src: &[u8],
        src_offset: usize,
        src_len: usize,
        dst: &mut [u8],
        dst_offset: usize,
        dst_len: usize,
    ) -> Result<usize> {
        self.run_slices(Direction::Compress, src, src_offset, src_len, dst, dst_offset, dst_len)
    }

    /// Decompress `src` into `dst`; returns the decompressed length.
    pub fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<usize> {
        let (src_len, dst_len) = (src.len(), dst.len());
        self.decompress_range(src, 0, src_len, dst, 0, dst_len)
    }

    pub fn decompress_range(
        &mut self,
        src: &[u8],
        src_offset: usize,
        src_len: usize,
        dst: &mut [u8],
        dst_offset: usize,
        dst_len: usize,
    ) -> Result<usize> {
        self.run_slices(Direction::Decompress, src, src_offset, src_len, dst, dst_offset, dst_len)
    }

    #[allow(clippy::too_many_arguments)]
    fn run_slices(
        &mut self,
        direction: Direction,
        src: &[u8],
        src_offset: usize,
        src_len: usize,
        dst: &mut [u8],
        dst_offset: usize,
        dst_len: usize,
    ) -> Result<usize> {
        self.context_ref()?;
        self.bytes_read = 0;
        self.bytes_written = 0;
        let (sv, dv) = check_slices(src.len(), src_offset, src_len, dst.len(), dst_offset, dst_len)?;

        let input = &src[sv.offset..sv.offset + sv.length];
        let output = &mut dst[dv.offset..dv.offset + dv.length];
        let stage = match direction {
            Direction::Compress => Stage::Compress,
            Direction::Decompress => Stage::Decompress,
        };

        let Self { context, counters, timer, .. } = self;
        let ctx = context.as_mut().ok_or(QatError::SessionEnded)?;
        let t = timer
            .time(stage, || ctx.run(direction, input, output, counters))
            .map_err(|status| status_error(status, dv.length))?;

        self.record(direction, t.consumed, t.produced);
        Ok(t.produced)
    }

    /// Compress `src[position..limit]` into `dst[position..limit]`,
    /// advancing both positions.
    pub fn compress_buffer(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<usize> {
        self.run_buffers(Direction::Compress, src, dst)
    }

    pub fn decompress_buffer(&mut self, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<usize> {
        self.run_buffers(Direction::Decompress, src, dst)
    }

    fn run_buffers(&mut self, direction: Direction, src: &mut ByteBuffer, dst: &mut ByteBuffer) -> Result<usize> {
        self.context_ref()?;
        self.bytes_read = 0;
        self.bytes_written = 0;

        let Self { context, pool, counters, timer, .. } = self;
        let ctx = context.as_mut().ok_or(QatError::SessionEnded)?;
        let t = transfer_buffers(ctx, pool, counters, timer, direction, src, dst)?;

        self.record(direction, t.consumed, t.produced);
        Ok(t.produced)
    }

    fn record(&mut self, direction: Direction, consumed: usize, produced: usize) {
        self.bytes_read = consumed;
        self.bytes_written = produced;
        match direction {
            Direction::Compress => self.counters.add_compress(consumed, produced),
            Direction::Decompress => self.counters.add_decompress(consumed, produced),
        }
    }

    /// Upper bound on the compressed size of `src_len` bytes.
    pub fn max_compressed_length(&self, src_len: usize) -> Result<usize> {
        Ok(self.context_ref()?.max_compressed_size(src_len))
    }

    /// Toggle the zstd content checksum.
    pub fn set_checksum_flag(&mut self, enabled: bool) -> Result<()> {
        let algorithm = self.config.algorithm;
        let ctx = self.context_mut()?;
        if !registry::resolve(algorithm).supports_checksum {
            return Err(QatError::Unsupported(format!("checksum flag is not supported by {}", algorithm)));
        }
        ctx.set_checksum(enabled).map_err(QatError::Native)
    }

    /// Tear down the native context and free pooled buffers. Idempotent.
    pub fn end(&mut self) -> Result<()> {
        if self.state == SessionState::Ended {
            return Ok(());
        }
        self.state = SessionState::Ended;
        let drained = self.pool.drain();
        let torn_down = match self.context.take() {
            Some(ctx) => self.timer.time(Stage::Teardown, || ctx.teardown()),
            None => Ok(()),
        };
        debug!(handle = %self.handle, "session ended");
        match drained {
            Ok(n) => debug!(handle = %self.handle, freed = n, "pool drained"),
            Err(e) => warn!(handle = %self.handle, error = %e, "pool drain refused"),
        }
        torn_down.map_err(QatError::Native)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }

    pub fn level(&self) -> i32 {
        self.config.level
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn retry_count(&self) -> u32 {
        self.config.retry_count
    }

    pub fn polling_mode(&self) -> PollingMode {
        self.config.polling_mode
    }

    pub fn data_format(&self) -> DataFormat {
        self.config.data_format
    }

    pub fn hardware_buffer_size(&self) -> HardwareBufferSize {
        self.config.hardware_buffer_size
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    /// Bytes consumed by the last successful call; 0 after a failed one.
    pub fn bytes_read(&self) -> Result<usize> {
        self.context_ref()?;
        Ok(self.bytes_read)
    }

    /// Bytes produced by the last successful call; 0 after a failed one.
    pub fn bytes_written(&self) -> Result<usize> {
        self.context_ref()?;
        Ok(self.bytes_written)
    }

    pub fn uses_hardware(&self) -> bool {
        self.context.as_ref().map_or(false, NativeContext::uses_hardware)
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(self.handle.get(), &self.counters, self.pool.stats(), &self.timer)
    }

    pub(crate) fn counters_mut(&mut self) -> &mut SessionCounters {
        &mut self.counters
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            warn!(handle = %self.handle, "session dropped without end(), releasing");
            if let Err(e) = self.end() {
                warn!(handle = %self.handle, error = %e, "teardown on drop failed");
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}
