//! # Startup Memory Budgets
//!
//! The byte budgets the application hands the memory subsystem at
//! startup. Loaded once from the engine's TOML configuration, validated,
//! then used to size the root region and everything carved from it. After
//! startup the budget is never consulted again; the allocators enforce
//! their own capacities.

use serde::Deserialize;

use super::{MemoryError, MemoryResult};

/// Startup byte budgets for the engine's pre-reserved regions.
///
/// Each field is a governed size. Bookkeeping rides on top: the exact
/// footprint of a component, overhead included, comes from its config's
/// `required_bytes`, and the application sizes the root region so the
/// accounted footprints fit.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemoryBudget {
    /// Total bytes reserved for the root region at startup.
    pub root_region_bytes: usize,
    /// Bytes of the per-frame marker allocator.
    pub frame_scratch_bytes: usize,
    /// Bytes governed by the general allocator for resource payloads.
    pub resource_heap_bytes: usize,
}

impl Default for MemoryBudget {
    fn default() -> Self {
        Self {
            root_region_bytes: 64 * 1024 * 1024,
            frame_scratch_bytes: 8 * 1024 * 1024,
            resource_heap_bytes: 32 * 1024 * 1024,
        }
    }
}

impl MemoryBudget {
    /// Checks that the budget adds up: a non-empty root region and
    /// sub-budgets that fit inside it.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::InvalidBudget`] with the reason when it
    /// does not.
    pub fn validate(&self) -> MemoryResult<()> {
        if self.root_region_bytes == 0 {
            return Err(MemoryError::InvalidBudget {
                reason: "root region is zero bytes".to_string(),
            });
        }

        let Some(children) = self
            .frame_scratch_bytes
            .checked_add(self.resource_heap_bytes)
        else {
            return Err(MemoryError::InvalidBudget {
                reason: "sub-budgets overflow".to_string(),
            });
        };
        if children > self.root_region_bytes {
            return Err(MemoryError::InvalidBudget {
                reason: format!(
                    "sub-budgets need {} bytes, root region holds {}",
                    children, self.root_region_bytes
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_validates() {
        MemoryBudget::default().validate().unwrap();
    }

    #[test]
    fn test_budget_parses_from_toml() {
        let budget: MemoryBudget = toml::from_str(
            r#"
            root_region_bytes = 1048576
            frame_scratch_bytes = 262144
            resource_heap_bytes = 524288
            "#,
        )
        .unwrap();
        assert_eq!(budget.root_region_bytes, 1024 * 1024);
        assert_eq!(budget.frame_scratch_bytes, 256 * 1024);
        budget.validate().unwrap();
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let budget: MemoryBudget = toml::from_str("frame_scratch_bytes = 4096").unwrap();
        assert_eq!(budget.frame_scratch_bytes, 4096);
        assert_eq!(
            budget.root_region_bytes,
            MemoryBudget::default().root_region_bytes
        );
    }

    #[test]
    fn test_oversubscribed_budget_is_rejected() {
        let budget = MemoryBudget {
            root_region_bytes: 1024,
            frame_scratch_bytes: 1024,
            resource_heap_bytes: 1024,
        };
        let err = budget.validate().unwrap_err();
        assert!(matches!(err, MemoryError::InvalidBudget { .. }));
    }

    #[test]
    fn test_zero_root_is_rejected() {
        let budget = MemoryBudget {
            root_region_bytes: 0,
            frame_scratch_bytes: 0,
            resource_heap_bytes: 0,
        };
        assert!(budget.validate().is_err());
    }
}
