//! # Memory Error Types
//!
//! All recoverable failures the memory subsystem can report.
//!
//! Programming errors (a non-power-of-two alignment, a marker rolled past
//! the current offset, a zero-sized request) are hard assertions at the
//! offending call site, not variants here: they indicate a bug in calling
//! code, never a runtime resource condition.

use thiserror::Error;

/// Errors that can occur in the memory subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// A bump allocator ran out of region space.
    #[error("region exhausted: requested {requested} bytes, {available} of {total} bytes left")]
    RegionExhausted {
        /// Bytes requested, before alignment padding.
        requested: usize,
        /// Bytes still unallocated in the region.
        available: usize,
        /// Total region size.
        total: usize,
    },

    /// No free extent was large enough to satisfy an allocation.
    #[error("no extent fits: requested {requested} bytes, {available} bytes free in total")]
    NoExtentFits {
        /// Bytes requested.
        requested: usize,
        /// Total free bytes, fragmented across extents.
        available: usize,
    },

    /// The free-list node pool cannot track another disjoint extent.
    #[error("extent pool exhausted: all {capacity} nodes in use")]
    PoolExhausted {
        /// Fixed node-pool capacity (governed size / pointer width).
        capacity: usize,
    },

    /// A freed block does not lie inside the governed region.
    #[error("block out of bounds: offset {offset} size {size} outside the {total}-byte region")]
    OutOfBounds {
        /// Offset of the rejected block.
        offset: usize,
        /// Size of the rejected block.
        size: usize,
        /// Governed region size.
        total: usize,
    },

    /// A startup budget does not add up.
    #[error("invalid memory budget: {reason}")]
    InvalidBudget {
        /// Why the budget was rejected.
        reason: String,
    },
}

/// Result type for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_counts() {
        let err = MemoryError::RegionExhausted {
            requested: 128,
            available: 64,
            total: 1024,
        };
        let text = err.to_string();
        assert!(text.contains("128"));
        assert!(text.contains("64"));
        assert!(text.contains("1024"));
    }

    #[test]
    fn test_errors_are_comparable() {
        let a = MemoryError::PoolExhausted { capacity: 4 };
        let b = MemoryError::PoolExhausted { capacity: 4 };
        assert_eq!(a, b);
    }
}
