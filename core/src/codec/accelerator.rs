//! codec/accelerator.rs
//! Hardware accelerator seam and an emulated device.
//!
//! The emulated device runs the software engine behind a device queue that
//! can be told to answer `Busy` a number of times, or to report that no
//! hardware exists at all. It lets hosts without QAT silicon exercise the
//! hardware path, including retries and fallback.

use std::env;

use tracing::{debug, trace};

use crate::codec::engine::{NativeCodec, SoftwareCodec};
use crate::codec::types::{CodecParams, NativeStatus, Transfer};
use crate::constants::EMULATED_DEVICE_ENV;

/// A compression device. Submissions may answer `Busy` (resubmit) or
/// `NoHardware` (device gone).
pub trait Accelerator: Send {
    fn name(&self) -> &str;
    fn open(&mut self, params: &CodecParams) -> Result<(), NativeStatus>;
    fn close(&mut self) -> Result<(), NativeStatus>;
    fn submit_compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus>;
    fn submit_decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus>;
    fn max_compressed_size(&self, src_len: usize) -> usize;
    fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus>;
}

pub struct EmulatedAccelerator {
    engine: SoftwareCodec,
    busy_responses: u32,
    present: bool,
    submissions: u64,
}

impl EmulatedAccelerator {
    pub fn new() -> Self {
        Self::with_busy_responses(0)
    }

    /// Device whose next `n` submissions answer `Busy`.
    pub fn with_busy_responses(n: u32) -> Self {
        Self {
            engine: SoftwareCodec::new(),
            busy_responses: n,
            present: true,
            submissions: 0,
        }
    }

    /// Device that fails to open with `NoHardware`.
    pub fn unavailable() -> Self {
        Self { present: false, ..Self::new() }
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    fn admit(&mut self) -> Result<(), NativeStatus> {
        self.submissions += 1;
        if !self.present {
            return Err(NativeStatus::NoHardware);
        }
        if self.busy_responses > 0 {
            self.busy_responses -= 1;
            trace!(remaining = self.busy_responses, "emulated device busy");
            return Err(NativeStatus::Busy);
        }
        Ok(())
    }
}

impl Default for EmulatedAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accelerator for EmulatedAccelerator {
    fn name(&self) -> &str {
        "emulated"
    }

    fn open(&mut self, params: &CodecParams) -> Result<(), NativeStatus> {
        if !self.present {
            return Err(NativeStatus::NoHardware);
        }
        self.engine.setup(params)
    }

    fn close(&mut self) -> Result<(), NativeStatus> {
        self.engine.teardown()
    }

    fn submit_compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        self.admit()?;
        self.engine.compress(src, dst)
    }

    fn submit_decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        self.admit()?;
        self.engine.decompress(src, dst)
    }

    fn max_compressed_size(&self, src_len: usize) -> usize {
        self.engine.max_compressed_size(src_len)
    }

    fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus> {
        self.engine.set_checksum(enabled)
    }
}

/// Look for a usable device on this host.
pub fn detect() -> Option<Box<dyn Accelerator>> {
    match env::var(EMULATED_DEVICE_ENV) {
        Ok(v) if v == "1" => {
            debug!("using emulated accelerator");
            Some(Box::new(EmulatedAccelerator::new()))
        }
        _ => None,
    }
}
