//! types.rs
//! Crate-wide error type and `Result` alias.

use std::io;
use thiserror::Error;

use crate::{codec::NativeStatus, native::BridgeError};

/// Unified error for session, adapter and bridge operations.
/// - Validation errors are raised before any engine call.
/// - `From<T>` impls enable `?` across the layers.
#[derive(Debug, Error)]
pub enum QatError {
    /// Empty source/destination, bad level or retry count, malformed config.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Offset/length window outside the buffer capacity.
    #[error("{what} window out of bounds: offset {offset} + length {length} exceeds capacity {capacity}")]
    Bounds {
        what: &'static str,
        offset: usize,
        length: usize,
        capacity: usize,
    },

    /// Destination buffer lacks write permission.
    #[error("destination buffer is read-only")]
    ReadOnlyBuffer,

    /// Operation on a session that has already been ended.
    #[error("session has been ended")]
    SessionEnded,

    /// Destination too small for the produced bytes (detected by the engine).
    #[error("insufficient output space: {available} bytes available")]
    InsufficientOutput {
        needed: Option<usize>,
        available: usize,
    },

    /// Algorithm-specific option on an algorithm that does not support it.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Native memory could not be obtained.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(BridgeError),

    /// Misuse of the native buffer bridge (foreign or cross-thread buffer).
    #[error("native buffer bridge error: {0}")]
    Bridge(BridgeError),

    /// Engine failure, including exhausted hardware retries.
    #[error("native codec error: {0}")]
    Native(NativeStatus),
}

pub type Result<T> = std::result::Result<T, QatError>;

impl QatError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QatError::InvalidArgument(msg.into())
    }
}

impl From<BridgeError> for QatError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::AllocationFailed { .. } => QatError::ResourceExhausted(e),
            other => QatError::Bridge(other),
        }
    }
}

impl From<NativeStatus> for QatError {
    fn from(status: NativeStatus) -> Self {
        QatError::Native(status)
    }
}

impl From<QatError> for io::Error {
    fn from(e: QatError) -> Self {
        let kind = match &e {
            QatError::InvalidArgument(_) | QatError::Bounds { .. } => io::ErrorKind::InvalidInput,
            QatError::ReadOnlyBuffer => io::ErrorKind::PermissionDenied,
            QatError::ResourceExhausted(_) => io::ErrorKind::OutOfMemory,
            QatError::Native(NativeStatus::DataError(_)) => io::ErrorKind::InvalidData,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
