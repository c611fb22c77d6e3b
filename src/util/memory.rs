//! Pluggable byte-buffer allocation.
//!
//! Every raw buffer the codecs produce is obtained from a [`Memory`] handler
//! and wrapped in a [`Block`], which remembers the handler and hands the
//! bytes back to it when dropped. A buffer can therefore never be released
//! through a different handler than the one that created it.
use std::{
    cell::Cell,
    fmt,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use super::{Error, Result};

pub trait Memory {
    /// Returns a buffer of exactly `size` bytes. Contents are unspecified.
    fn allocate(&self, size: usize) -> Result<Vec<u8>>;

    /// Returns a zero-filled buffer of `count * size` bytes.
    fn zero_allocate(&self, count: usize, size: usize) -> Result<Vec<u8>>;

    /// Grows or shrinks `block` to `size` bytes, keeping the common prefix.
    /// On failure `block` is left untouched.
    fn reallocate(&self, block: &mut Vec<u8>, size: usize) -> Result<()>;

    fn free(&self, block: Vec<u8>);
}

pub type MemoryRef = Rc<dyn Memory>;

/// The default handler, backed by the global allocator.
pub struct StdMemory;

impl StdMemory {
    fn reserve(size: usize) -> Result<Vec<u8>> {
        let mut block = Vec::new();
        block
            .try_reserve_exact(size)
            .map_err(|_| Error::alloc_fail(&format!("unable to allocate {} bytes", size)))?;
        block.resize(size, 0);
        Ok(block)
    }
}

impl Memory for StdMemory {
    fn allocate(&self, size: usize) -> Result<Vec<u8>> {
        Self::reserve(size)
    }

    fn zero_allocate(&self, count: usize, size: usize) -> Result<Vec<u8>> {
        let total = count
            .checked_mul(size)
            .ok_or_else(|| Error::alloc_fail("allocation size overflow"))?;
        Self::reserve(total)
    }

    fn reallocate(&self, block: &mut Vec<u8>, size: usize) -> Result<()> {
        if size > block.len() {
            block
                .try_reserve_exact(size - block.len())
                .map_err(|_| Error::alloc_fail(&format!("unable to grow to {} bytes", size)))?;
        }
        block.resize(size, 0);
        Ok(())
    }

    fn free(&self, block: Vec<u8>) {
        drop(block);
    }
}

pub fn default_memory() -> MemoryRef {
    Rc::new(StdMemory)
}

/// A handler that accounts for every byte it hands out.
///
/// Usage figures follow the outstanding buffers: `memory_usage` drops back
/// when buffers are freed, `peak_usage` never does. An optional limit makes
/// any allocation that would push usage over it fail.
pub struct TrackingMemory {
    inner: StdMemory,
    memory_usage: Cell<usize>,
    peak_usage: Cell<usize>,
    allocations: Cell<usize>,
    limit: Option<usize>,
}

impl TrackingMemory {
    pub fn new() -> Self {
        Self {
            inner: StdMemory,
            memory_usage: Cell::new(0),
            peak_usage: Cell::new(0),
            allocations: Cell::new(0),
            limit: None,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    pub fn memory_usage(&self) -> usize {
        self.memory_usage.get()
    }

    pub fn peak_usage(&self) -> usize {
        self.peak_usage.get()
    }

    /// Number of buffers currently outstanding
    pub fn allocations(&self) -> usize {
        self.allocations.get()
    }

    fn charge(&self, bytes: usize) -> Result<()> {
        let usage = self.memory_usage.get().saturating_add(bytes);
        if let Some(limit) = self.limit {
            if usage > limit {
                return Err(Error::alloc_fail(&format!(
                    "allocation of {} bytes exceeds limit of {}",
                    bytes, limit
                )));
            }
        }
        self.memory_usage.set(usage);
        self.peak_usage.set(self.peak_usage.get().max(usage));
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.memory_usage
            .set(self.memory_usage.get().saturating_sub(bytes));
    }
}

impl Default for TrackingMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory for TrackingMemory {
    fn allocate(&self, size: usize) -> Result<Vec<u8>> {
        self.charge(size)?;
        let block = self.inner.allocate(size).inspect_err(|_| self.release(size))?;
        self.allocations.set(self.allocations.get() + 1);
        Ok(block)
    }

    fn zero_allocate(&self, count: usize, size: usize) -> Result<Vec<u8>> {
        let total = count
            .checked_mul(size)
            .ok_or_else(|| Error::alloc_fail("allocation size overflow"))?;
        self.allocate(total)
    }

    fn reallocate(&self, block: &mut Vec<u8>, size: usize) -> Result<()> {
        let old = block.len();
        if size > old {
            self.charge(size - old)?;
            self.inner
                .reallocate(block, size)
                .inspect_err(|_| self.release(size - old))
        } else {
            self.release(old - size);
            self.inner.reallocate(block, size)
        }
    }

    fn free(&self, block: Vec<u8>) {
        self.release(block.len());
        self.allocations
            .set(self.allocations.get().saturating_sub(1));
        self.inner.free(block);
    }
}

/// A byte buffer bound to the handler that allocated it.
pub struct Block {
    data: Vec<u8>,
    memory: MemoryRef,
}

impl Block {
    pub fn allocate(memory: &MemoryRef, size: usize) -> Result<Self> {
        Ok(Self {
            data: memory.allocate(size)?,
            memory: memory.clone(),
        })
    }

    pub fn zeroed(memory: &MemoryRef, size: usize) -> Result<Self> {
        Ok(Self {
            data: memory.zero_allocate(1, size)?,
            memory: memory.clone(),
        })
    }

    pub fn from_slice(memory: &MemoryRef, bytes: &[u8]) -> Result<Self> {
        let mut block = Self::allocate(memory, bytes.len())?;
        block.data.copy_from_slice(bytes);
        Ok(block)
    }

    /// Resizes through the owning handler. On failure the block is left as
    /// it was.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        self.memory.reallocate(&mut self.data, size)
    }

    pub fn memory(&self) -> &MemoryRef {
        &self.memory
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Block {}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Block").field(&self.data).finish()
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        self.memory.free(std::mem::take(&mut self.data));
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::util::{Code, Random};

    #[test]
    fn test_memory_empty() {
        let memory = TrackingMemory::new();
        assert_eq!(0, memory.memory_usage());
        assert_eq!(0, memory.allocations());
    }

    #[test]
    fn test_memory_tracking_simple() {
        let tracker = Rc::new(TrackingMemory::new());
        let memory: MemoryRef = tracker.clone();
        let mut allocated: Vec<Block> = Vec::new();
        let mut rnd = Random::new(301);
        let mut bytes = 0usize;
        for i in 0..1000usize {
            let s = if rnd.one_in(10) {
                rnd.uniform(6000) as usize
            } else {
                rnd.uniform(20) as usize
            };
            let mut block = Block::allocate(&memory, s).unwrap();
            for b in block.iter_mut() {
                // Fill the "i"th allocation with a known bit pattern
                *b = i as u8;
            }
            bytes += s;
            allocated.push(block);
            assert_eq!(bytes, tracker.memory_usage());
        }
        for (i, block) in allocated.iter().enumerate() {
            assert!(block.iter().all(|&b| b == i as u8));
        }
        assert_eq!(1000, tracker.allocations());
        drop(allocated);
        assert_eq!(0, tracker.memory_usage());
        assert_eq!(0, tracker.allocations());
        assert_eq!(bytes, tracker.peak_usage());
    }

    #[test]
    fn test_memory_limit() {
        let tracker = Rc::new(TrackingMemory::with_limit(64));
        let memory: MemoryRef = tracker.clone();
        let first = Block::allocate(&memory, 60).unwrap();
        let err = Block::allocate(&memory, 8).unwrap_err();
        assert_eq!(Code::MemoryAllocFail, err.code());
        assert_eq!(60, tracker.memory_usage());
        drop(first);
        assert!(Block::allocate(&memory, 64).is_ok());
    }

    #[test]
    fn test_block_resize() {
        let tracker = Rc::new(TrackingMemory::with_limit(100));
        let memory: MemoryRef = tracker.clone();
        let mut block = Block::from_slice(&memory, &[1, 2, 3]).unwrap();
        block.resize(10).unwrap();
        assert_eq!(&[1, 2, 3, 0, 0, 0, 0, 0, 0, 0], &block[..]);
        assert_eq!(10, tracker.memory_usage());

        let err = block.resize(200).unwrap_err();
        assert_eq!(Code::MemoryAllocFail, err.code());
        assert_eq!(10, block.len());
        assert_eq!(10, tracker.memory_usage());

        block.resize(2).unwrap();
        assert_eq!(&[1, 2], &block[..]);
        assert_eq!(2, tracker.memory_usage());
    }

    #[test]
    fn test_std_memory_zero_allocate() {
        let memory = default_memory();
        let block = memory.zero_allocate(4, 3).unwrap();
        assert_eq!(vec![0u8; 12], block);
        let err = memory.zero_allocate(usize::MAX, 2).unwrap_err();
        assert_eq!(Code::MemoryAllocFail, err.code());
    }
}
