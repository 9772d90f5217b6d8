//! telemetry/counters.rs
//! Mutable counters collected by one session and its streams.
//!
//! Converted into an immutable TelemetrySnapshot on request.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected during session calls.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub calls_compress: u64,
    pub calls_decompress: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub hardware_calls: u64,
    pub software_calls: u64,
    pub retries: u64,
    pub fallbacks: u64,
    pub staged_bytes: u64,
    pub frames_written: u64,
    pub frames_read: u64,
}

impl SessionCounters {
    /// Record one successful compress call.
    pub fn add_compress(&mut self, consumed: usize, produced: usize) {
        self.calls_compress += 1;
        self.bytes_in += consumed as u64;
        self.bytes_out += produced as u64;
    }

    /// Record one successful decompress call.
    /// `bytes_in` stays the uncompressed side so ratios read the same way.
    pub fn add_decompress(&mut self, consumed: usize, produced: usize) {
        self.calls_decompress += 1;
        self.bytes_in += produced as u64;
        self.bytes_out += consumed as u64;
    }

    pub fn add_hardware_call(&mut self) {
        self.hardware_calls += 1;
    }

    pub fn add_software_call(&mut self) {
        self.software_calls += 1;
    }

    pub fn add_retry(&mut self) {
        self.retries += 1;
    }

    pub fn add_fallback(&mut self) {
        self.fallbacks += 1;
    }

    /// Bytes copied through bridge scratch buffers.
    pub fn add_staged(&mut self, len: usize) {
        self.staged_bytes += len as u64;
    }

    pub fn add_frame_written(&mut self) {
        self.frames_written += 1;
    }

    pub fn add_frame_read(&mut self) {
        self.frames_read += 1;
    }

    pub fn calls(&self) -> u64 {
        self.calls_compress + self.calls_decompress
    }

    pub fn merge(&mut self, other: &SessionCounters) {
        self.calls_compress += other.calls_compress;
        self.calls_decompress += other.calls_decompress;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
        self.hardware_calls += other.hardware_calls;
        self.software_calls += other.software_calls;
        self.retries += other.retries;
        self.fallbacks += other.fallbacks;
        self.staged_bytes += other.staged_bytes;
        self.frames_written += other.frames_written;
        self.frames_read += other.frames_read;
    }
}

impl AddAssign for SessionCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
