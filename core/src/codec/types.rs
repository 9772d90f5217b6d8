//! codec/types.rs
//! Engine configuration enums, call parameters and native status codes.

use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_HW_BUFFER_SIZE, DEFAULT_LEVEL, MAX_HW_BUFFER_SIZE};

/// Compression algorithm carried out by the engine.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Deflate = 0,
    Lz4 = 1,
    Zstd = 2,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Deflate => "deflate",
            Algorithm::Lz4 => "lz4",
            Algorithm::Zstd => "zstd",
        };
        write!(f, "{}", name)
    }
}

/// Execution mode.
/// - `Hardware`: accelerator only, busy exhaustion is a hard error.
/// - `Auto`: accelerator first, software engine when it is absent or saturated.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Hardware = 0,
    Auto = 1,
}

/// How the device queue is polled for completions.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollingMode {
    Busy = 0,
    Periodical = 1,
}

/// Container format for DEFLATE output. Ignored by LZ4 and ZSTD.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive, Serialize, Deserialize)]
pub enum DataFormat {
    #[serde(rename = "deflate_raw")]
    DeflateRaw = 0,
    #[serde(rename = "deflate_4b")]
    Deflate4B = 1,
    #[serde(rename = "deflate_gzip")]
    DeflateGzip = 2,
    #[serde(rename = "deflate_gzip_ext")]
    DeflateGzipExt = 3,
}

/// Size of the buffers the device queue works with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareBufferSize {
    #[serde(rename = "64k")]
    Default64K,
    #[serde(rename = "512k")]
    Max512K,
}

impl HardwareBufferSize {
    pub fn bytes(self) -> usize {
        match self {
            HardwareBufferSize::Default64K => DEFAULT_HW_BUFFER_SIZE,
            HardwareBufferSize::Max512K => MAX_HW_BUFFER_SIZE,
        }
    }
}

/// Parameters handed to an engine at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    pub algorithm: Algorithm,
    pub level: i32,
    pub data_format: DataFormat,
    pub polling_mode: PollingMode,
    pub hw_buffer_size: usize,
    pub checksum: bool,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Deflate,
            level: DEFAULT_LEVEL,
            data_format: DataFormat::DeflateGzipExt,
            polling_mode: PollingMode::Busy,
            hw_buffer_size: DEFAULT_HW_BUFFER_SIZE,
            checksum: false,
        }
    }
}

/// Bytes consumed from the source and produced into the destination by one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    pub consumed: usize,
    pub produced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

/// Numeric status table of the native engine.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum StatusCode {
    Ok = 0,
    Params = -1,
    Fail = -2,
    BufError = -3,
    DataError = -4,
    NoHardware = -101,
    NoInstanceAttached = -104,
}

/// Non-success outcome of an engine call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeStatus {
    /// Device instance not attached (queue saturated); safe to resubmit.
    #[error("device busy, no instance attached")]
    Busy,
    #[error("no compression hardware available")]
    NoHardware,
    #[error("destination buffer too small")]
    BufferError { needed: Option<usize> },
    #[error("corrupt input: {0}")]
    DataError(String),
    #[error("engine failure: {0}")]
    Failure(String),
}

impl NativeStatus {
    pub fn code(&self) -> StatusCode {
        match self {
            NativeStatus::Busy => StatusCode::NoInstanceAttached,
            NativeStatus::NoHardware => StatusCode::NoHardware,
            NativeStatus::BufferError { .. } => StatusCode::BufError,
            NativeStatus::DataError(_) => StatusCode::DataError,
            NativeStatus::Failure(_) => StatusCode::Fail,
        }
    }

    /// Busy is the only status worth resubmitting.
    pub fn is_transient(&self) -> bool {
        matches!(self, NativeStatus::Busy)
    }

    /// Map a raw status code. `Ok` yields `None`; unknown codes become `Failure`.
    pub fn from_code(raw: i32) -> Option<NativeStatus> {
        match StatusCode::try_from_primitive(raw) {
            Ok(StatusCode::Ok) => None,
            Ok(StatusCode::NoInstanceAttached) => Some(NativeStatus::Busy),
            Ok(StatusCode::NoHardware) => Some(NativeStatus::NoHardware),
            Ok(StatusCode::BufError) => Some(NativeStatus::BufferError { needed: None }),
            Ok(StatusCode::DataError) => Some(NativeStatus::DataError("engine reported data error".into())),
            Ok(StatusCode::Params) => Some(NativeStatus::Failure("invalid engine parameters".into())),
            Ok(StatusCode::Fail) => Some(NativeStatus::Failure("engine failure".into())),
            Err(_) => Some(NativeStatus::Failure(format!("unknown status code {}", raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_both_ways() {
        assert_eq!(NativeStatus::from_code(0), None);
        assert_eq!(NativeStatus::from_code(-104), Some(NativeStatus::Busy));
        assert_eq!(NativeStatus::Busy.code() as i32, -104);
        assert_eq!(NativeStatus::NoHardware.code(), StatusCode::NoHardware);
        assert!(matches!(NativeStatus::from_code(-77), Some(NativeStatus::Failure(_))));
    }

    #[test]
    fn only_busy_is_transient() {
        assert!(NativeStatus::Busy.is_transient());
        assert!(!NativeStatus::NoHardware.is_transient());
        assert!(!NativeStatus::BufferError { needed: None }.is_transient());
    }

    #[test]
    fn algorithm_from_primitive() {
        assert_eq!(Algorithm::try_from_primitive(2).ok(), Some(Algorithm::Zstd));
        assert!(Algorithm::try_from_primitive(9).is_err());
    }
}
