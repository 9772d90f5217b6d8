//! native/mod.rs
//! Native side of a session: context handle, engine dispatch, and the buffer
//! bridge (owned native memory plus a per-thread scratch pool).

pub mod buffer;
pub mod context;
pub mod pool;
pub mod types;

pub use buffer::NativeBuffer;
pub use context::{ContextHandle, NativeContext};
pub use pool::{BufferPool, PoolStats};
pub use types::*;
