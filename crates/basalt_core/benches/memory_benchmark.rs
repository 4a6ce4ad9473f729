//! # Memory Subsystem Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - allocate/free hot paths never touch the platform heap
//! - bump allocation is an offset add, nanoseconds not microseconds
//!
//! Run with: `cargo bench --package basalt_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use basalt_core::{FreeListConfig, GeneralConfig, MarkerConfig, RegionConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Region size shared by the bump benchmarks.
const REGION_BYTES: usize = 16 * 1024 * 1024;

/// Benchmark: bump-allocate a frame's worth of blocks, then reset.
fn bench_region_bump(c: &mut Criterion) {
    c.bench_function("region_allocate_1000_reset", |b| {
        let mut region = RegionConfig::new(REGION_BYTES).build();
        b.iter(|| {
            for _ in 0..1000 {
                let _ = black_box(region.allocate(64));
            }
            region.reset();
        });
    });
}

/// Benchmark: marker capture and rollback around nested scratch use.
fn bench_marker_rollback(c: &mut Criterion) {
    c.bench_function("marker_scope_100_allocs", |b| {
        let mut scratch = MarkerConfig::new(REGION_BYTES).build();
        b.iter(|| {
            let marker = scratch.mark();
            for _ in 0..100 {
                let _ = black_box(scratch.allocate(256));
            }
            scratch.free_to_marker(marker);
        });
    });
}

/// Benchmark: free-list churn with coalescing frees.
fn bench_freelist_churn(c: &mut Criterion) {
    c.bench_function("freelist_alloc_free_pairs", |b| {
        let mut list = FreeListConfig::new(1024 * 1024).build();
        b.iter(|| {
            let a = list.alloc(black_box(256)).unwrap();
            let b2 = list.alloc(black_box(1024)).unwrap();
            list.free(a, 256).unwrap();
            list.free(b2, 1024).unwrap();
        });
    });
}

/// Benchmark: general allocator round-trip, the resource-payload path.
fn bench_general_roundtrip(c: &mut Criterion) {
    c.bench_function("general_allocate_free_4k", |b| {
        let mut heap = GeneralConfig::new(1024 * 1024).build();
        b.iter(|| {
            let block = heap.allocate(black_box(4096)).unwrap();
            heap.free(block).unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_region_bump,
    bench_marker_rollback,
    bench_freelist_churn,
    bench_general_roundtrip
);
criterion_main!(benches);
