//! native/context.rs
//! Native compression context: owns the engines for one session, dispatches
//! calls with the busy-retry policy and falls back to software in AUTO mode.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use crate::codec::{Accelerator, CodecParams, Direction, Mode, NativeCodec, NativeStatus, SoftwareCodec, Transfer};
use crate::telemetry::SessionCounters;

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique context id. Never a raw pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(NonZeroU64);

impl ContextHandle {
    pub(crate) fn next() -> Self {
        loop {
            if let Some(id) = NonZeroU64::new(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)) {
                return ContextHandle(id);
            }
        }
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

pub struct NativeContext {
    handle: ContextHandle,
    mode: Mode,
    retry_count: u32,
    accelerator: Option<Box<dyn Accelerator>>,
    software: Option<SoftwareCodec>,
}

impl NativeContext {
    /// Set up the engines for `mode`.
    /// - HARDWARE: the accelerator must exist and open, no software engine.
    /// - AUTO: the accelerator is kept only if it opens; software is always ready.
    pub fn setup(
        handle: ContextHandle,
        params: CodecParams,
        mode: Mode,
        retry_count: u32,
        accelerator: Option<Box<dyn Accelerator>>,
    ) -> Result<Self, NativeStatus> {
        let accelerator = match (mode, accelerator) {
            (Mode::Hardware, None) => return Err(NativeStatus::NoHardware),
            (Mode::Hardware, Some(mut acc)) => {
                acc.open(&params)?;
                Some(acc)
            }
            (Mode::Auto, Some(mut acc)) => match acc.open(&params) {
                Ok(()) => Some(acc),
                Err(status) => {
                    debug!(%handle, device = acc.name(), %status, "accelerator unavailable, software only");
                    None
                }
            },
            (Mode::Auto, None) => {
                debug!(%handle, "no accelerator found, software only");
                None
            }
        };

        let software = match mode {
            Mode::Hardware => None,
            Mode::Auto => {
                let mut sw = SoftwareCodec::new();
                sw.setup(&params)?;
                Some(sw)
            }
        };

        debug!(
            %handle,
            algorithm = %params.algorithm,
            level = params.level,
            hardware = accelerator.is_some(),
            "native context set up"
        );
        Ok(Self { handle, mode, retry_count, accelerator, software })
    }

    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    pub fn uses_hardware(&self) -> bool {
        self.accelerator.is_some()
    }

    /// One engine call: accelerator with up to `retry_count` resubmissions,
    /// then software in AUTO mode.
    pub fn run(
        &mut self,
        direction: Direction,
        src: &[u8],
        dst: &mut [u8],
        counters: &mut SessionCounters,
    ) -> Result<Transfer, NativeStatus> {
        if let Some(acc) = self.accelerator.as_mut() {
            let attempts = self.retry_count as u64 + 1;
            let mut last = NativeStatus::Busy;
            for attempt in 1..=attempts {
                let result = match direction {
                    Direction::Compress => acc.submit_compress(src, dst),
                    Direction::Decompress => acc.submit_decompress(src, dst),
                };
                match result {
                    Ok(t) => {
                        counters.add_hardware_call();
                        return Ok(t);
                    }
                    Err(NativeStatus::Busy) => {
                        trace!(handle = %self.handle, attempt, "device busy");
                        if attempt < attempts {
                            counters.add_retry();
                        }
                    }
                    Err(NativeStatus::NoHardware) => {
                        last = NativeStatus::NoHardware;
                        break;
                    }
                    Err(other) => return Err(other),
                }
            }

            match self.software.as_mut() {
                Some(sw) => {
                    debug!(handle = %self.handle, status = %last, len = src.len(), "falling back to software");
                    counters.add_fallback();
                    counters.add_software_call();
                    return match direction {
                        Direction::Compress => sw.compress(src, dst),
                        Direction::Decompress => sw.decompress(src, dst),
                    };
                }
                None => return Err(last),
            }
        }

        let sw = self
            .software
            .as_mut()
            .ok_or(NativeStatus::NoHardware)?;
        counters.add_software_call();
        match direction {
            Direction::Compress => sw.compress(src, dst),
            Direction::Decompress => sw.decompress(src, dst),
        }
    }

    /// Bound valid for whichever engine ends up serving the call.
    pub fn max_compressed_size(&self, src_len: usize) -> usize {
        let hw = self.accelerator.as_ref().map_or(0, |a| a.max_compressed_size(src_len));
        let sw = self.software.as_ref().map_or(0, |s| s.max_compressed_size(src_len));
        hw.max(sw).max(src_len)
    }

    pub fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus> {
        if let Some(acc) = self.accelerator.as_mut() {
            acc.set_checksum(enabled)?;
        }
        if let Some(sw) = self.software.as_mut() {
            sw.set_checksum(enabled)?;
        }
        Ok(())
    }

    /// Release both engines. Every engine is torn down; the first failure is returned.
    pub fn teardown(mut self) -> Result<(), NativeStatus> {
        let mut first_err = None;
        if let Some(mut acc) = self.accelerator.take() {
            if let Err(status) = acc.close() {
                warn!(handle = %self.handle, %status, "accelerator close failed");
                first_err.get_or_insert(status);
            }
        }
        if let Some(mut sw) = self.software.take() {
            if let Err(status) = sw.teardown() {
                first_err.get_or_insert(status);
            }
        }
        debug!(handle = %self.handle, mode = ?self.mode, "native context torn down");
        match first_err {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EmulatedAccelerator;

    #[test]
    fn handles_are_unique() {
        let a = ContextHandle::next();
        let b = ContextHandle::next();
        assert_ne!(a, b);
        assert!(a.get() > 0);
    }

    #[test]
    fn hardware_mode_needs_a_device() {
        let err = NativeContext::setup(ContextHandle::next(), CodecParams::default(), Mode::Hardware, 0, None)
            .err();
        assert_eq!(err, Some(NativeStatus::NoHardware));
    }

    #[test]
    fn auto_mode_drops_unavailable_device() {
        let ctx = NativeContext::setup(
            ContextHandle::next(),
            CodecParams::default(),
            Mode::Auto,
            0,
            Some(Box::new(EmulatedAccelerator::unavailable())),
        )
        .unwrap();
        assert!(!ctx.uses_hardware());
        ctx.teardown().unwrap();
    }
}
