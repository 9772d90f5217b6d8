//! native/pool.rs
//! Per-session cache of native scratch buffers, keyed by thread and size.
//!
//! Buffers are checked out for the duration of one engine call and checked
//! back in afterwards. A buffer may only come back to the pool that issued it,
//! on the thread that took it; anything else is refused and the buffer freed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use tracing::trace;

use crate::constants::MIN_POOL_BUCKET;
use crate::native::buffer::NativeBuffer;
use crate::native::types::{BridgeError, BridgeId};

static NEXT_BRIDGE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub allocations: u64,
    pub reuses: u64,
    pub frees: u64,
}

pub struct BufferPool {
    id: BridgeId,
    cache: HashMap<(ThreadId, usize), Vec<NativeBuffer>>,
    outstanding: usize,
    stats: PoolStats,
}

fn bucket_for(size: usize) -> usize {
    size.max(MIN_POOL_BUCKET).next_power_of_two()
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            id: NEXT_BRIDGE.fetch_add(1, Ordering::Relaxed),
            cache: HashMap::new(),
            outstanding: 0,
            stats: PoolStats::default(),
        }
    }

    pub fn id(&self) -> BridgeId {
        self.id
    }

    /// Hand out a buffer of at least `size` bytes.
    pub fn checkout(&mut self, size: usize) -> Result<NativeBuffer, BridgeError> {
        if size == 0 {
            return Err(BridgeError::InvalidSize(0));
        }
        let bucket = bucket_for(size);
        let key = (thread::current().id(), bucket);
        let buf = match self.cache.get_mut(&key).and_then(Vec::pop) {
            Some(buf) => {
                self.stats.reuses += 1;
                buf
            }
            None => {
                let buf = NativeBuffer::alloc(bucket, self.id)?;
                self.stats.allocations += 1;
                buf
            }
        };
        self.outstanding += 1;
        trace!(bridge = self.id, address = buf.address(), len = bucket, "checkout");
        Ok(buf)
    }

    /// Return a buffer taken from this pool on this thread.
    pub fn checkin(&mut self, buf: NativeBuffer) -> Result<(), BridgeError> {
        if buf.bridge() != self.id {
            return Err(BridgeError::ForeignBuffer {
                address: buf.address(),
                owner: buf.bridge(),
                bridge: self.id,
            });
        }
        self.outstanding = self.outstanding.saturating_sub(1);
        if buf.thread() != thread::current().id() {
            self.stats.frees += 1;
            return Err(BridgeError::CrossThread { address: buf.address() });
        }
        self.cache
            .entry((buf.thread(), buf.capacity()))
            .or_default()
            .push(buf);
        Ok(())
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn cached(&self) -> usize {
        self.cache.values().map(Vec::len).sum()
    }

    /// Free every cached buffer. Refused while buffers are checked out.
    pub fn drain(&mut self) -> Result<usize, BridgeError> {
        if self.outstanding > 0 {
            return Err(BridgeError::BufferInUse(self.outstanding));
        }
        let freed = self.cached();
        self.cache.clear();
        self.stats.frees += freed as u64;
        Ok(freed)
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
