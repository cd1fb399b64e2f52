//! Runs with `CountingAllocator` as this test binary's global allocator.
//! Kept to a single test so no other test thread allocates mid-measurement.

use growth_bench::alloc::{AllocatorProbe, CountingAllocator};
use growth_bench::harness::HeapProbe;
use growth_bench::Sampler;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator::new();

const MIB: usize = 1 << 20;

#[test]
fn heap_delta_tracks_retained_and_released_memory() {
    let _warm = vec![0u8; 16];
    assert!(ALLOC.is_active());
    let probe = AllocatorProbe::installed().expect("counting allocator is global");
    assert!(probe.heap_bytes() > 0);

    // picks the counting allocator up without being told
    let sampler = Sampler::new();

    // output is kept alive past the post-invocation reading
    let kept = sampler.measure(2, |n| n, |&n| vec![1u8; n * MIB]);
    assert_eq!(kept.output.len(), 2 * MIB);
    let mb = kept.point.memory_mb;
    assert!((1.99..2.25).contains(&mb), "retained delta {mb}");

    // scratch space freed before the function returns
    let scratch = sampler.measure(
        4,
        |n| n,
        |&n| {
            let tmp = vec![7u8; n * MIB];
            tmp.iter().map(|&b| b as u64).sum::<u64>()
        },
    );
    assert!(scratch.point.memory_mb.abs() < 0.25, "scratch delta {}", scratch.point.memory_mb);

    // freeing memory owned before the call gives a negative delta
    let held = std::cell::RefCell::new(Some(vec![0u8; 3 * MIB]));
    let released = sampler.measure(1, |n| n, |_| held.borrow_mut().take().map(|v| v.len()));
    assert_eq!(released.output, Some(3 * MIB));
    let mb = released.point.memory_mb;
    assert!((-3.25..-2.75).contains(&mb), "released delta {mb}");
}
