//! native/types.rs
//! Bridge identifiers and bridge errors.

use thiserror::Error;

/// Identifies the pool (bridge) a native buffer belongs to.
pub type BridgeId = u64;

/// Owner id of buffers allocated outside any pool (caller direct buffers).
pub const DETACHED: BridgeId = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("native allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    #[error("invalid native buffer size {0}")]
    InvalidSize(usize),

    #[error("buffer {address:#x} belongs to bridge {owner}, not bridge {bridge}")]
    ForeignBuffer { address: u64, owner: BridgeId, bridge: BridgeId },

    #[error("buffer {address:#x} returned on a different thread")]
    CrossThread { address: u64 },

    #[error("{0} native buffers still checked out")]
    BufferInUse(usize),

    #[error("copy of {len} bytes overflows native buffer of {capacity} bytes")]
    Overflow { len: usize, capacity: usize },
}
