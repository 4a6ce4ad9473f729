//! # Allocation Accounting
//!
//! Per-tag byte accounting for everything the engine draws from the
//! memory subsystem. The allocators themselves stay tag-agnostic; the
//! subsystem that requested the bytes records them here, so leaks show up
//! as a tag whose live count never returns to zero.

use std::fmt::Write;

/// The engine subsystem an allocation is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemoryTag {
    /// Allocations nobody claimed. A growing count here is a smell.
    Unknown,
    /// Event system queues and handler tables.
    Event,
    /// Input state and bindings.
    Input,
    /// Platform layer scratch.
    Platform,
    /// Renderer CPU-side resources.
    Renderer,
    /// Resource cache payloads.
    Resource,
    /// Per-frame scratch.
    Frame,
}

impl MemoryTag {
    /// Number of tags; sizes the counter arrays.
    pub const COUNT: usize = 7;

    /// All tags in report order.
    const ALL: [Self; Self::COUNT] = [
        Self::Unknown,
        Self::Event,
        Self::Input,
        Self::Platform,
        Self::Renderer,
        Self::Resource,
        Self::Frame,
    ];

    /// Counter-array index for the tag.
    const fn index(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Event => 1,
            Self::Input => 2,
            Self::Platform => 3,
            Self::Renderer => 4,
            Self::Resource => 5,
            Self::Frame => 6,
        }
    }

    /// Human-readable tag name for reports.
    const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Event => "event",
            Self::Input => "input",
            Self::Platform => "platform",
            Self::Renderer => "renderer",
            Self::Resource => "resource",
            Self::Frame => "frame",
        }
    }
}

/// Per-tag allocation accounting.
///
/// Tracks live bytes, the high-water mark, and the live allocation count
/// for every [`MemoryTag`]. Purely observational: recording here does not
/// allocate and does not touch any allocator.
#[derive(Debug)]
pub struct AllocationTracker {
    /// Live bytes per tag.
    current: [usize; MemoryTag::COUNT],
    /// High-water mark per tag.
    peak: [usize; MemoryTag::COUNT],
    /// Live allocation count per tag.
    count: [usize; MemoryTag::COUNT],
}

impl AllocationTracker {
    /// Creates a tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: [0; MemoryTag::COUNT],
            peak: [0; MemoryTag::COUNT],
            count: [0; MemoryTag::COUNT],
        }
    }

    /// Records an allocation of `size` bytes against `tag`.
    pub fn record_allocation(&mut self, tag: MemoryTag, size: usize) {
        let index = tag.index();
        self.current[index] += size;
        self.count[index] += 1;
        if self.current[index] > self.peak[index] {
            self.peak[index] = self.current[index];
        }
    }

    /// Records a free of `size` bytes against `tag`.
    ///
    /// Freeing more than was recorded saturates at zero; the mismatch is
    /// the caller's accounting bug and shows up as a drifting report.
    pub fn record_free(&mut self, tag: MemoryTag, size: usize) {
        let index = tag.index();
        self.current[index] = self.current[index].saturating_sub(size);
        self.count[index] = self.count[index].saturating_sub(1);
    }

    /// Returns the live bytes recorded against `tag`.
    #[inline]
    #[must_use]
    pub const fn live_bytes(&self, tag: MemoryTag) -> usize {
        self.current[tag.index()]
    }

    /// Returns the high-water mark recorded against `tag`.
    #[inline]
    #[must_use]
    pub const fn peak_bytes(&self, tag: MemoryTag) -> usize {
        self.peak[tag.index()]
    }

    /// Returns the number of live allocations recorded against `tag`.
    #[inline]
    #[must_use]
    pub const fn live_allocations(&self, tag: MemoryTag) -> usize {
        self.count[tag.index()]
    }

    /// Returns the live bytes across all tags.
    #[must_use]
    pub fn total_live_bytes(&self) -> usize {
        self.current.iter().sum()
    }

    /// Renders a human-readable usage report, one line per tag that has
    /// ever recorded anything.
    ///
    /// Diagnostic text for humans; observe the accessors, not this
    /// string.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::from("memory usage:");
        for tag in MemoryTag::ALL {
            let index = tag.index();
            if self.peak[index] == 0 {
                continue;
            }
            let _ = write!(
                out,
                "\n  {:<9} {} bytes live ({} allocations, peak {})",
                tag.name(),
                self.current[index],
                self.count[index],
                self.peak[index]
            );
        }
        out
    }

    /// Emits [`Self::report`] through the engine logger.
    pub fn log_report(&self) {
        tracing::debug!("{}", self.report());
    }
}

impl Default for AllocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_records_per_tag() {
        let mut tracker = AllocationTracker::new();
        tracker.record_allocation(MemoryTag::Renderer, 1024);
        tracker.record_allocation(MemoryTag::Renderer, 512);
        tracker.record_allocation(MemoryTag::Event, 64);

        assert_eq!(tracker.live_bytes(MemoryTag::Renderer), 1536);
        assert_eq!(tracker.live_allocations(MemoryTag::Renderer), 2);
        assert_eq!(tracker.live_bytes(MemoryTag::Event), 64);
        assert_eq!(tracker.total_live_bytes(), 1600);
    }

    #[test]
    fn test_peak_survives_frees() {
        let mut tracker = AllocationTracker::new();
        tracker.record_allocation(MemoryTag::Frame, 4096);
        tracker.record_free(MemoryTag::Frame, 4096);

        assert_eq!(tracker.live_bytes(MemoryTag::Frame), 0);
        assert_eq!(tracker.live_allocations(MemoryTag::Frame), 0);
        assert_eq!(tracker.peak_bytes(MemoryTag::Frame), 4096);
    }

    #[test]
    fn test_over_free_saturates() {
        let mut tracker = AllocationTracker::new();
        tracker.record_allocation(MemoryTag::Input, 16);
        tracker.record_free(MemoryTag::Input, 64);
        assert_eq!(tracker.live_bytes(MemoryTag::Input), 0);
    }

    #[test]
    fn test_report_skips_untouched_tags() {
        let mut tracker = AllocationTracker::new();
        tracker.record_allocation(MemoryTag::Resource, 256);

        let report = tracker.report();
        assert!(report.contains("resource"));
        assert!(!report.contains("platform"));
    }
}
