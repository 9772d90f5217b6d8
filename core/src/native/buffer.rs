//! native/buffer.rs
//! Owned native memory handed to the engine without copies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use crate::native::types::{BridgeError, BridgeId};

// Synthetic device-visible addresses, never zero.
static NEXT_ADDR: AtomicU64 = AtomicU64::new(0x1000_0000);

pub struct NativeBuffer {
    data: Box<[u8]>,
    address: u64,
    bridge: BridgeId,
    thread: ThreadId,
}

impl NativeBuffer {
    /// Allocate `size` zeroed bytes owned by `bridge` on the current thread.
    /// Allocation failure is reported, never retried.
    pub fn alloc(size: usize, bridge: BridgeId) -> Result<Self, BridgeError> {
        if size == 0 {
            return Err(BridgeError::InvalidSize(size));
        }
        let mut v: Vec<u8> = Vec::new();
        v.try_reserve_exact(size)
            .map_err(|_| BridgeError::AllocationFailed { size })?;
        v.resize(size, 0);
        let address = NEXT_ADDR.fetch_add(size.next_power_of_two() as u64, Ordering::Relaxed);
        Ok(Self {
            data: v.into_boxed_slice(),
            address,
            bridge,
            thread: thread::current().id(),
        })
    }

    /// Zero-length buffer backing an empty direct `ByteBuffer`. Pools never
    /// hand these out.
    pub(crate) fn empty(bridge: BridgeId) -> Self {
        Self {
            data: Box::default(),
            address: NEXT_ADDR.fetch_add(1, Ordering::Relaxed),
            bridge,
            thread: thread::current().id(),
        }
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn bridge(&self) -> BridgeId {
        self.bridge
    }

    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy `src` to the start of the buffer.
    pub fn copy_in(&mut self, src: &[u8]) -> Result<(), BridgeError> {
        if src.len() > self.data.len() {
            return Err(BridgeError::Overflow { len: src.len(), capacity: self.data.len() });
        }
        self.data[..src.len()].copy_from_slice(src);
        Ok(())
    }

    /// Copy the first `len` bytes into the start of `dst`.
    pub fn copy_out(&self, len: usize, dst: &mut [u8]) -> Result<(), BridgeError> {
        if len > self.data.len() || len > dst.len() {
            return Err(BridgeError::Overflow { len, capacity: self.data.len().min(dst.len()) });
        }
        dst[..len].copy_from_slice(&self.data[..len]);
        Ok(())
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("address", &format_args!("{:#x}", self.address))
            .field("capacity", &self.data.len())
            .field("bridge", &self.bridge)
            .finish()
    }
}
