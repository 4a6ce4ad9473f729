//! # Free-List Manager
//!
//! Tracks the unused byte ranges of a governed region as an offset-sorted,
//! singly-linked sequence of extents, with first-fit allocation and
//! coalescing free.
//!
//! The list's own nodes live in a fixed-capacity slot pool sized at
//! `total_size / size_of::<usize>()`. Bookkeeping never recurses into
//! another allocator, and if fragmentation ever needs more simultaneous
//! free extents than the pool holds, operations fail loudly instead of
//! growing.
//!
//! Allocation shrinks a larger extent from the front, so the allocation
//! path never claims a pool slot; only the free path can. Keep that
//! asymmetry when touching this code.

use super::{MemoryError, MemoryResult};

/// List terminator and "no slot" sentinel.
const INVALID_SLOT: u32 = u32::MAX;

/// One free extent: a contiguous unused byte range of the governed region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ExtentNode {
    /// Byte offset of the extent.
    offset: usize,
    /// Extent size in bytes.
    size: usize,
    /// Pool slot of the next extent in offset order, or `INVALID_SLOT`.
    next: u32,
}

impl ExtentNode {
    /// An unused slot.
    const EMPTY: Self = Self {
        offset: 0,
        size: 0,
        next: INVALID_SLOT,
    };

    /// Byte offset one past the end of the extent.
    #[inline]
    const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Two-phase configuration for a [`FreeList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeListConfig {
    /// Governed region size in bytes.
    total_size: usize,
}

impl FreeListConfig {
    /// Creates a config for a free-list governing `total_size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `total_size` is smaller than one pointer width (the node
    /// pool would be empty) or large enough to overflow the slot index
    /// space.
    #[must_use]
    pub fn new(total_size: usize) -> Self {
        let capacity = total_size / core::mem::size_of::<usize>();
        assert!(capacity > 0, "Governed size must hold at least one node");
        assert!(
            capacity < INVALID_SLOT as usize,
            "Governed size overflows the slot index space"
        );
        Self { total_size }
    }

    /// The fixed node-pool capacity: `total_size / size_of::<usize>()`.
    ///
    /// This bound is part of the contract. It caps how many disjoint free
    /// extents the list can track at once.
    #[inline]
    #[must_use]
    pub const fn node_capacity(&self) -> usize {
        self.total_size / core::mem::size_of::<usize>()
    }

    /// The bookkeeping footprint in bytes: header, node pool, and the
    /// free-slot stack. Used for budget accounting before `build`.
    #[inline]
    #[must_use]
    pub const fn required_bytes(&self) -> usize {
        let capacity = self.node_capacity();
        core::mem::size_of::<FreeList>()
            + capacity * core::mem::size_of::<ExtentNode>()
            + capacity * core::mem::size_of::<u32>()
    }

    /// Builds the free-list with one extent covering the whole governed
    /// range and every other pool slot available.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // capacity checked against INVALID_SLOT in new()
    pub fn build(self) -> FreeList {
        let capacity = self.node_capacity();
        let mut nodes = vec![ExtentNode::EMPTY; capacity].into_boxed_slice();
        nodes[0] = ExtentNode {
            offset: 0,
            size: self.total_size,
            next: INVALID_SLOT,
        };
        let free_slots: Vec<u32> = (1..capacity as u32).rev().collect();
        FreeList {
            total_size: self.total_size,
            head: 0,
            nodes,
            free_slots,
        }
    }
}

/// A first-fit free-list over a governed byte range.
///
/// Invariants, upheld after every operation:
/// - extents are offset-sorted and never overlap
/// - no two neighboring extents are mergeable (adjacent ranges are
///   coalesced on free)
///
/// # Thread Safety
///
/// Not thread-safe. The engine runs its allocators on the single main
/// thread.
pub struct FreeList {
    /// Governed region size in bytes.
    total_size: usize,
    /// Pool slot of the first (lowest-offset) extent, or `INVALID_SLOT`
    /// when the region is fully allocated.
    head: u32,
    /// The fixed-capacity node pool.
    nodes: Box<[ExtentNode]>,
    /// Stack of unused pool slots.
    free_slots: Vec<u32>,
}

impl FreeList {
    /// Returns the governed size in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.total_size
    }

    /// Returns the fixed node-pool capacity.
    #[inline]
    #[must_use]
    pub const fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Allocates `size` bytes, first-fit from the lowest offset.
    ///
    /// An exact fit removes the extent and returns its slot to the pool.
    /// A larger extent is shrunk from the front, which needs no pool slot;
    /// that keeps this path O(1) in pool pressure.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::NoExtentFits`] when no extent is large
    /// enough, with the total free byte count. The failure is logged; the
    /// list is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn alloc(&mut self, size: usize) -> MemoryResult<usize> {
        assert!(size > 0, "Allocation size must be greater than zero");

        let mut prev = INVALID_SLOT;
        let mut current = self.head;
        while current != INVALID_SLOT {
            let node = self.nodes[current as usize];

            if node.size == size {
                // Exact fit: unlink the extent entirely.
                if prev == INVALID_SLOT {
                    self.head = node.next;
                } else {
                    self.nodes[prev as usize].next = node.next;
                }
                self.free_slots.push(current);
                return Ok(node.offset);
            }

            if node.size > size {
                // Shrink from the front.
                let slot = &mut self.nodes[current as usize];
                let offset = slot.offset;
                slot.offset += size;
                slot.size -= size;
                return Ok(offset);
            }

            prev = current;
            current = node.next;
        }

        let available = self.space_free();
        tracing::warn!(
            "free-list allocation failed: requested {} bytes, {} bytes free",
            size,
            available
        );
        Err(MemoryError::NoExtentFits {
            requested: size,
            available,
        })
    }

    /// Returns `size` bytes at `offset` to the list, keeping it
    /// offset-sorted and coalescing with any adjacent extent.
    ///
    /// Three cases are checked in order: an extent already starting at
    /// `offset` absorbs the bytes (a previous free under-counted), then a
    /// forward merge with the following extent, then a backward merge with
    /// the preceding one. Only a fully disjoint range claims a new pool
    /// slot.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::OutOfBounds`] when the range does not lie
    /// inside the governed region, and [`MemoryError::PoolExhausted`] when
    /// a disjoint range needs a node the pool cannot supply. Both are
    /// logged and leave the list untouched.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn free(&mut self, offset: usize, size: usize) -> MemoryResult<()> {
        assert!(size > 0, "Freed size must be greater than zero");

        let end = offset.checked_add(size);
        let Some(end) = end.filter(|&e| e <= self.total_size) else {
            tracing::error!(
                "refusing free of offset {} size {}: outside the {}-byte governed region",
                offset,
                size,
                self.total_size
            );
            return Err(MemoryError::OutOfBounds {
                offset,
                size,
                total: self.total_size,
            });
        };

        // Find the first extent at or after `offset`, keeping its
        // predecessor.
        let mut prev = INVALID_SLOT;
        let mut current = self.head;
        while current != INVALID_SLOT && self.nodes[current as usize].offset < offset {
            prev = current;
            current = self.nodes[current as usize].next;
        }

        // Case (a): an extent already starts exactly here. Fold the sizes
        // together, then re-check both neighbors.
        if current != INVALID_SLOT && self.nodes[current as usize].offset == offset {
            self.nodes[current as usize].size += size;
            self.merge_with_next(current);
            if prev != INVALID_SLOT && self.nodes[prev as usize].end() == offset {
                self.merge_with_next(prev);
            }
            return Ok(());
        }

        // Case (b): the freed range ends where the next extent starts.
        // Pull that extent's front back; no new node needed.
        if current != INVALID_SLOT && end == self.nodes[current as usize].offset {
            let slot = &mut self.nodes[current as usize];
            slot.offset = offset;
            slot.size += size;
            // The grown extent may now touch its predecessor.
            if prev != INVALID_SLOT && self.nodes[prev as usize].end() == offset {
                self.merge_with_next(prev);
            }
            return Ok(());
        }

        // Case (c): the freed range starts where the predecessor ends.
        // Grow it in place; the next extent starts past `end`, or case
        // (b) would have taken it.
        if prev != INVALID_SLOT && self.nodes[prev as usize].end() == offset {
            self.nodes[prev as usize].size += size;
            return Ok(());
        }

        // Disjoint: record a brand-new extent.
        let Some(slot) = self.free_slots.pop() else {
            tracing::error!(
                "free-list pool exhausted: {} nodes cannot track another disjoint extent",
                self.nodes.len()
            );
            return Err(MemoryError::PoolExhausted {
                capacity: self.nodes.len(),
            });
        };
        self.nodes[slot as usize] = ExtentNode {
            offset,
            size,
            next: current,
        };
        if prev == INVALID_SLOT {
            self.head = slot;
        } else {
            self.nodes[prev as usize].next = slot;
        }
        Ok(())
    }

    /// Sum of all free extent sizes. O(extent count).
    #[must_use]
    pub fn space_free(&self) -> usize {
        self.extents().map(|(_, size)| size).sum()
    }

    /// Restores the list to a single extent covering the whole region and
    /// marks every other pool slot available.
    #[allow(clippy::cast_possible_truncation)] // capacity checked against INVALID_SLOT at build
    pub fn clear(&mut self) {
        for node in self.nodes.iter_mut() {
            *node = ExtentNode::EMPTY;
        }
        self.nodes[0] = ExtentNode {
            offset: 0,
            size: self.total_size,
            next: INVALID_SLOT,
        };
        self.head = 0;
        self.free_slots.clear();
        self.free_slots.extend((1..self.nodes.len() as u32).rev());
    }

    /// Iterates the free extents as `(offset, size)` pairs in offset
    /// order. Diagnostic surface; the invariant tests scan it.
    pub fn extents(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        ExtentIter {
            list: self,
            slot: self.head,
        }
    }

    /// Merges the extent after `slot` into `slot` when the two touch.
    fn merge_with_next(&mut self, slot: u32) {
        let next = self.nodes[slot as usize].next;
        if next == INVALID_SLOT {
            return;
        }
        if self.nodes[slot as usize].end() != self.nodes[next as usize].offset {
            return;
        }
        let absorbed = self.nodes[next as usize];
        let node = &mut self.nodes[slot as usize];
        node.size += absorbed.size;
        node.next = absorbed.next;
        self.free_slots.push(next);
    }
}

/// Offset-ordered walk of the extent list.
struct ExtentIter<'a> {
    /// The list being walked.
    list: &'a FreeList,
    /// Next slot to yield, or `INVALID_SLOT`.
    slot: u32,
}

impl Iterator for ExtentIter<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.slot == INVALID_SLOT {
            return None;
        }
        let node = self.list.nodes[self.slot as usize];
        self.slot = node.next;
        Some((node.offset, node.size))
    }
}
