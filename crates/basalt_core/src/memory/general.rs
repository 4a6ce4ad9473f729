//! # General Allocator
//!
//! The engine's variable-size allocate/free allocator: a [`FreeList`]
//! keeps the bookkeeping while an equally sized data region holds the
//! bytes actually handed to callers.
//!
//! This is the only component in the subsystem with independent,
//! out-of-order allocate and free. It is the right tool whenever block
//! lifetimes are unrelated and unordered, variable-length resource
//! payloads being the typical case. For allocate-many/free-all lifetimes
//! the region allocator is cheaper.

use bytemuck::{AnyBitPattern, NoUninit};

use super::{Block, FreeList, FreeListConfig, MemoryError, MemoryResult};

/// Two-phase configuration for a [`GeneralAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Governed data-region size in bytes.
    total_size: usize,
    /// Config of the free-list doing the bookkeeping.
    freelist: FreeListConfig,
}

impl GeneralConfig {
    /// Creates a config for a general allocator governing `total_size`
    /// bytes.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`FreeListConfig::new`].
    #[must_use]
    pub fn new(total_size: usize) -> Self {
        Self {
            total_size,
            freelist: FreeListConfig::new(total_size),
        }
    }

    /// The total footprint in bytes: free-list bookkeeping plus the data
    /// region itself.
    #[inline]
    #[must_use]
    pub const fn required_bytes(&self) -> usize {
        self.freelist.required_bytes() + self.total_size
    }

    /// Builds the allocator: the free-list over `[0, total_size)` and a
    /// zeroed data region of the same size.
    #[must_use]
    pub fn build(self) -> GeneralAllocator {
        GeneralAllocator {
            total_size: self.total_size,
            freelist: self.freelist.build(),
            data: vec![0u8; self.total_size].into_boxed_slice(),
        }
    }
}

/// A free-list-backed general allocator.
///
/// Every [`Block`] it returns lies inside `[0, capacity())` of its data
/// region; the free-list's offsets are always relative to the start of
/// that region.
///
/// Double frees and stale blocks are not detected (no generation tags on
/// blocks); that correctness burden stays with the caller. Generation
/// tags are the hardening step if it ever bites.
///
/// # Thread Safety
///
/// Not thread-safe. The engine runs its allocators on the single main
/// thread.
pub struct GeneralAllocator {
    /// Governed data-region size in bytes.
    total_size: usize,
    /// Bookkeeping: which byte ranges of the data region are free.
    freelist: FreeList,
    /// The bytes actually handed to callers.
    data: Box<[u8]>,
}

impl GeneralAllocator {
    /// Returns the governed data-region size in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.total_size
    }

    /// Allocates a block of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::NoExtentFits`] when fragmentation or
    /// exhaustion leaves no extent large enough. The failure is logged
    /// with requested-vs-free counts; callers must free something before
    /// retrying, the allocator will not.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Block> {
        match self.freelist.alloc(size) {
            Ok(offset) => Ok(Block { offset, size }),
            Err(err) => {
                tracing::error!(
                    "general allocation failed: requested {} bytes, {} bytes free",
                    size,
                    self.freelist.space_free()
                );
                Err(err)
            }
        }
    }

    /// Frees a block previously returned by [`Self::allocate`].
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfBounds`] when the block does not lie
    /// inside the governed region; the refusal is logged and nothing is
    /// mutated. Pool exhaustion from [`FreeList::free`] is propagated
    /// as-is.
    ///
    /// # Panics
    ///
    /// Panics if the block's size is zero.
    pub fn free(&mut self, block: Block) -> MemoryResult<()> {
        let in_bounds = block
            .offset
            .checked_add(block.size)
            .is_some_and(|end| end <= self.total_size);
        if !in_bounds {
            tracing::error!(
                "refusing to free block at offset {} size {}: outside the {}-byte governed region",
                block.offset,
                block.size,
                self.total_size
            );
            return Err(MemoryError::OutOfBounds {
                offset: block.offset,
                size: block.size,
                total: self.total_size,
            });
        }
        self.freelist.free(block.offset, block.size)
    }

    /// Returns the total free bytes, fragmented across extents.
    #[inline]
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.freelist.space_free()
    }

    /// Returns the bytes of an allocated block.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not lie inside the governed region.
    #[inline]
    #[must_use]
    pub fn bytes(&self, block: Block) -> &[u8] {
        assert!(
            block.end() <= self.total_size,
            "Block does not lie inside the governed region"
        );
        &self.data[block.offset..block.end()]
    }

    /// Returns the bytes of an allocated block, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `block` does not lie inside the governed region.
    #[inline]
    pub fn bytes_mut(&mut self, block: Block) -> &mut [u8] {
        assert!(
            block.end() <= self.total_size,
            "Block does not lie inside the governed region"
        );
        &mut self.data[block.offset..block.end()]
    }

    /// Reads a POD value from the front of a block.
    ///
    /// # Panics
    ///
    /// Panics if the block is smaller than `T` or out of bounds.
    #[must_use]
    pub fn read_pod<T: AnyBitPattern>(&self, block: Block) -> T {
        let len = core::mem::size_of::<T>();
        assert!(block.size >= len, "Block is smaller than the value read");
        bytemuck::pod_read_unaligned(&self.bytes(block)[..len])
    }

    /// Writes a POD value to the front of a block.
    ///
    /// # Panics
    ///
    /// Panics if the block is smaller than `T` or out of bounds.
    pub fn write_pod<T: NoUninit>(&mut self, block: Block, value: &T) {
        let raw = bytemuck::bytes_of(value);
        assert!(
            block.size >= raw.len(),
            "Block is smaller than the value written"
        );
        self.bytes_mut(block)[..raw.len()].copy_from_slice(raw);
    }

    /// Hard-resets the governed region: every block is released and the
    /// free-list returns to a single whole-region extent.
    pub fn clear(&mut self) {
        self.freelist.clear();
    }
}
