//! # BASALT Core Engine
//!
//! The memory kernel every BASALT subsystem allocates through:
//! - Region (bump) allocators for subsystem-lifetime memory
//! - A marker allocator for LIFO-nested scratch scopes
//! - A first-fit free-list and the general allocator built on it
//!
//! ## Architecture Rules
//!
//! 1. **All memory is reserved at startup** - nothing below the outermost
//!    region touches the platform heap after `build`
//! 2. **Two-phase construction** - ask a config for `required_bytes`,
//!    account it against the startup budget, then `build`
//! 3. **Failures are values, bugs are assertions** - exhaustion is a
//!    returned error the caller decides about; an invalid request halts
//!
//! ## Example
//!
//! ```rust,ignore
//! use basalt_core::{MemoryBudget, RegionConfig};
//!
//! let budget = MemoryBudget::default();
//! budget.validate().expect("memory budget");
//!
//! let mut frame = RegionConfig::new(budget.frame_scratch_bytes).build();
//! let block = frame.allocate(4096).expect("frame scratch");
//! frame.bytes_mut(block).fill(0xAB);
//! frame.reset();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;

pub use memory::{
    AllocationTracker, Block, FreeList, FreeListConfig, GeneralAllocator, GeneralConfig, Marker,
    MarkerAllocator, MarkerConfig, MemoryBudget, MemoryError, MemoryResult, MemoryTag,
    RegionAllocator, RegionConfig, DEFAULT_ALIGNMENT,
};
