//! telemetry/snapshot.rs
//! Immutable, serialisable view of a session's counters and stage timings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::native::PoolStats;
use crate::telemetry::counters::SessionCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub handle: u64,
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
    pub pool_allocations: u64,
    pub pool_reuses: u64,
    pub pool_frees: u64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(handle: u64, counters: &SessionCounters, pool: PoolStats, timer: &TelemetryTimer) -> Self {
        Self {
            handle,
            calls_compress: counters.calls_compress,
            calls_decompress: counters.calls_decompress,
            bytes_in: counters.bytes_in,
            bytes_out: counters.bytes_out,
            hardware_calls: counters.hardware_calls,
            software_calls: counters.software_calls,
            retries: counters.retries,
            fallbacks: counters.fallbacks,
            staged_bytes: counters.staged_bytes,
            frames_written: counters.frames_written,
            frames_read: counters.frames_read,
            pool_allocations: pool.allocations,
            pool_reuses: pool.reuses,
            pool_frees: pool.frees,
            elapsed: timer.elapsed(),
            stage_times: timer.stage_times.clone(),
        }
    }

    /// Compressed bytes per uncompressed byte; 0.0 before any data moved.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            return 0.0;
        }
        self.bytes_out as f64 / self.bytes_in as f64
    }

    pub fn calls(&self) -> u64 {
        self.calls_compress + self.calls_decompress
    }

    /// Uncompressed bytes per second of wall time.
    pub fn throughput_bytes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_in as f64 / secs
        } else {
            0.0
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
