//! buffer.rs
//! Position/limit byte buffers in three storage flavours: heap, direct
//! (native memory) and read-only.
//!
//! Invariant: `position <= limit <= capacity`. The live window handed to a
//! session is `[position, limit)`.

use std::sync::Arc;

use bitflags::bitflags;
use bytes::Bytes;

use crate::native::{NativeBuffer, DETACHED};
use crate::types::{QatError, Result};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferFlags: u8 {
        const DIRECT    = 0b0001;
        const READ_ONLY = 0b0010;
        const HAS_ARRAY = 0b0100;
    }
}

// Direct memory is shared with read-only views, never copied into them.
enum Storage {
    Heap(Vec<u8>),
    Direct(Arc<NativeBuffer>),
    ReadOnlyHeap(Bytes),
    ReadOnlyDirect(Arc<NativeBuffer>),
}

pub struct ByteBuffer {
    storage: Storage,
    position: usize,
    limit: usize,
}

impl ByteBuffer {
    /// Heap buffer of `capacity` zeroed bytes.
    pub fn allocate(capacity: usize) -> Self {
        Self { storage: Storage::Heap(vec![0u8; capacity]), position: 0, limit: capacity }
    }

    /// Direct buffer backed by native memory. Zero capacity is allowed and
    /// yields an empty window.
    pub fn allocate_direct(capacity: usize) -> Result<Self> {
        let native = match capacity {
            0 => NativeBuffer::empty(DETACHED),
            n => NativeBuffer::alloc(n, DETACHED)?,
        };
        Ok(Self { storage: Storage::Direct(Arc::new(native)), position: 0, limit: capacity })
    }

    /// Heap buffer over `data`, window covering all of it.
    pub fn wrap(data: Vec<u8>) -> Self {
        let limit = data.len();
        Self { storage: Storage::Heap(data), position: 0, limit }
    }

    /// Direct buffer holding a copy of `data`, window covering all of it.
    pub fn wrap_direct(data: &[u8]) -> Result<Self> {
        let mut buf = Self::allocate_direct(data.len())?;
        buf.as_mut_slice()?.copy_from_slice(data);
        Ok(buf)
    }

    /// Read-only view with the same contents, position and limit.
    /// Direct views share the native memory; the original refuses writes
    /// while a view is alive.
    pub fn as_read_only(&self) -> Self {
        let storage = match &self.storage {
            Storage::Direct(n) | Storage::ReadOnlyDirect(n) => Storage::ReadOnlyDirect(Arc::clone(n)),
            Storage::Heap(v) => Storage::ReadOnlyHeap(Bytes::copy_from_slice(v)),
            Storage::ReadOnlyHeap(b) => Storage::ReadOnlyHeap(b.clone()),
        };
        Self { storage, position: self.position, limit: self.limit }
    }

    pub fn capacity(&self) -> usize {
        self.as_slice().len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(QatError::invalid(format!(
                "position {} beyond limit {}",
                position, self.limit
            )));
        }
        self.position = position;
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Set the limit; the position is pulled back if it would exceed it.
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity() {
            return Err(QatError::invalid(format!(
                "limit {} beyond capacity {}",
                limit,
                self.capacity()
            )));
        }
        self.limit = limit;
        self.position = self.position.min(limit);
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.position < self.limit
    }

    pub fn flags(&self) -> BufferFlags {
        match &self.storage {
            Storage::Heap(_) => BufferFlags::HAS_ARRAY,
            Storage::Direct(_) => BufferFlags::DIRECT,
            Storage::ReadOnlyDirect(_) => BufferFlags::DIRECT | BufferFlags::READ_ONLY,
            Storage::ReadOnlyHeap(_) => BufferFlags::READ_ONLY,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.flags().contains(BufferFlags::DIRECT)
    }

    pub fn is_read_only(&self) -> bool {
        self.flags().contains(BufferFlags::READ_ONLY)
    }

    /// True only for writable heap buffers.
    pub fn has_array(&self) -> bool {
        self.flags().contains(BufferFlags::HAS_ARRAY)
    }

    pub fn clear(&mut self) {
        self.position = 0;
        self.limit = self.capacity();
    }

    pub fn flip(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Relative bulk put at the position.
    pub fn put(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > self.remaining() {
            return Err(QatError::Bounds {
                what: "put",
                offset: self.position,
                length: src.len(),
                capacity: self.limit,
            });
        }
        let start = self.position;
        self.as_mut_slice()?[start..start + src.len()].copy_from_slice(src);
        self.position += src.len();
        Ok(())
    }

    pub fn put_u8(&mut self, b: u8) -> Result<()> {
        self.put(&[b])
    }

    /// Relative bulk get into `dst`, which must fit in the remaining window.
    pub fn get(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.remaining() {
            return Err(QatError::Bounds {
                what: "get",
                offset: self.position,
                length: dst.len(),
                capacity: self.limit,
            });
        }
        let start = self.position;
        dst.copy_from_slice(&self.as_slice()[start..start + dst.len()]);
        self.position += dst.len();
        Ok(())
    }

    /// Whole backing store, ignoring position and limit.
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Heap(v) => v.as_slice(),
            Storage::Direct(n) | Storage::ReadOnlyDirect(n) => n.as_slice(),
            Storage::ReadOnlyHeap(bytes) => bytes.as_ref(),
        }
    }

    pub fn as_mut_slice(&mut self) -> Result<&mut [u8]> {
        match &mut self.storage {
            Storage::Heap(v) => Ok(v.as_mut_slice()),
            Storage::Direct(n) => Arc::get_mut(n)
                .map(NativeBuffer::as_mut_slice)
                .ok_or(QatError::ReadOnlyBuffer),
            Storage::ReadOnlyHeap(_) | Storage::ReadOnlyDirect(_) => Err(QatError::ReadOnlyBuffer),
        }
    }

    /// `[position, limit)`.
    pub fn window(&self) -> &[u8] {
        &self.as_slice()[self.position..self.limit]
    }

    pub fn window_mut(&mut self) -> Result<&mut [u8]> {
        let (start, end) = (self.position, self.limit);
        Ok(&mut self.as_mut_slice()?[start..end])
    }

    /// Backing array of a writable heap buffer.
    pub fn array(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Heap(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Copy of `[position, limit)`.
    pub fn to_vec(&self) -> Vec<u8> {
        self.window().to_vec()
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.position = (self.position + n).min(self.limit);
    }
}

impl std::fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("flags", &self.flags())
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity())
            .finish()
    }
}
