//! Counting wrapper around the system allocator.
//!
//! Rust has no ambient heap-usage query, so live heap bytes are tracked here.
//! Install it in the binary (or test binary) that runs benchmarks:
//!
//! ```ignore
//! use growth_bench::alloc::CountingAllocator;
//!
//! #[global_allocator]
//! static ALLOC: CountingAllocator = CountingAllocator::new();
//! ```
//!
//! The first allocation through it marks it installed, after which
//! `Sampler::new()` (and so `run_benchmark`) reads heap usage from it.
//! Counters are process-wide: there is only ever one global allocator.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::harness::HeapProbe;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static DEALLOCATED: AtomicUsize = AtomicUsize::new(0);
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Bytes currently allocated through [`CountingAllocator`].
pub fn live_bytes() -> usize {
    let allocated = ALLOCATED.load(Ordering::Acquire);
    let deallocated = DEALLOCATED.load(Ordering::Acquire);
    allocated.saturating_sub(deallocated)
}

/// Whether any allocation has gone through [`CountingAllocator`], i.e. it is the global allocator.
pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::Relaxed)
}

fn record_alloc(size: usize) {
    ALLOCATED.fetch_add(size, Ordering::AcqRel);
    INSTALLED.store(true, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    DEALLOCATED.fetch_add(size, Ordering::AcqRel);
}

#[derive(Debug, Default)]
pub struct CountingAllocator {
    _private: (),
}

impl CountingAllocator {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    pub fn live_bytes(&self) -> usize {
        live_bytes()
    }

    pub fn is_active(&self) -> bool {
        is_installed()
    }
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            record_dealloc(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

/// Heap probe backed by the [`CountingAllocator`] counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocatorProbe;

impl AllocatorProbe {
    /// `Some` once a [`CountingAllocator`] has served an allocation.
    pub fn installed() -> Option<Self> {
        is_installed().then_some(AllocatorProbe)
    }
}

impl HeapProbe for AllocatorProbe {
    fn heap_bytes(&self) -> usize {
        live_bytes()
    }
}
