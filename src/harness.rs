use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::alloc::AllocatorProbe;
use crate::schema::MeasurementPoint;

const BYTES_PER_MB: f64 = 1_048_576.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }

    /// Default size ladder. Sizes grow by 2.5x so a linear workload lands
    /// between the 1.5 and 3 raw-ratio thresholds and a quadratic one above 6.
    pub fn sizes(&self) -> Vec<usize> {
        match self {
            Profile::Quick => geometric_sizes(400, 2.5, 4),
            Profile::Full => geometric_sizes(400, 2.5, 6),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    /// Generator RNG for one input size; the same (seed, size) always yields the same input.
    pub fn rng_for_size(&self, size: usize) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(per_size_seed(self.seed, size))
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.profile.sizes()
    }
}

fn per_size_seed(master_seed: u64, size: usize) -> u64 {
    master_seed
        .wrapping_add(size as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

/// `count` sizes starting at `start`, each `factor` times the previous (rounded down, never repeating).
pub fn geometric_sizes(start: usize, factor: f64, count: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(count);
    let mut current = start.max(1) as f64;
    for _ in 0..count {
        let size = (current as usize).max(out.last().map_or(1, |&prev: &usize| prev + 1));
        out.push(size);
        current *= factor;
    }
    out
}

/// Monotonic time source read before and after each invocation.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// Current heap usage in bytes.
pub trait HeapProbe {
    fn heap_bytes(&self) -> usize;
}

/// Best-effort collection pass requested right before timing starts.
pub trait Collector {
    fn collect(&self);
}

impl<F: Fn()> Collector for F {
    fn collect(&self) {
        self()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Probe for hosts without heap accounting; every delta is zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHeapProbe;

impl HeapProbe for NoHeapProbe {
    fn heap_bytes(&self) -> usize {
        0
    }
}

/// Manually advanced clock. Clones share the same time, so a function under
/// test can charge itself a modelled cost.
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Manually adjusted heap counter, shared between clones.
#[derive(Clone, Debug, Default)]
pub struct VirtualHeap {
    bytes: Rc<Cell<usize>>,
}

impl VirtualHeap {
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: Rc::new(Cell::new(bytes)),
        }
    }

    pub fn grow(&self, by: usize) {
        self.bytes.set(self.bytes.get().saturating_add(by));
    }

    pub fn shrink(&self, by: usize) {
        self.bytes.set(self.bytes.get().saturating_sub(by));
    }
}

impl HeapProbe for VirtualHeap {
    fn heap_bytes(&self) -> usize {
        self.bytes.get()
    }
}

/// A measured point together with what the function under test returned.
#[derive(Clone, Debug)]
pub struct Sample<R> {
    pub point: MeasurementPoint,
    pub output: R,
}

/// Runs the function under test once per call and records time and heap delta.
///
/// There is no warm-up, repetition or outlier rejection: one invocation, one point.
pub struct Sampler {
    clock: Box<dyn Clock>,
    heap: Box<dyn HeapProbe>,
    collector: Option<Box<dyn Collector>>,
}

impl Sampler {
    /// Wall clock, no collector. Heap deltas come from the counting
    /// allocator when it is installed and are zero otherwise.
    pub fn new() -> Self {
        let heap: Box<dyn HeapProbe> = match AllocatorProbe::installed() {
            Some(probe) => Box::new(probe),
            None => Box::new(NoHeapProbe),
        };
        Self {
            clock: Box::new(MonotonicClock::new()),
            heap,
            collector: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_heap(mut self, heap: impl HeapProbe + 'static) -> Self {
        self.heap = Box::new(heap);
        self
    }

    pub fn with_collector(mut self, collector: impl Collector + 'static) -> Self {
        self.collector = Some(Box::new(collector));
        self
    }

    pub fn measure<I, R>(
        &self,
        size: usize,
        generator: impl FnOnce(usize) -> I,
        function: impl FnOnce(&I) -> R,
    ) -> Sample<R> {
        let input = generator(size);

        if let Some(collector) = &self.collector {
            collector.collect();
        }

        let heap_before = self.heap.heap_bytes();
        let start = self.clock.now();
        let output = black_box(function(black_box(&input)));
        let end = self.clock.now();
        let heap_after = self.heap.heap_bytes();

        let elapsed = end.saturating_sub(start);
        let time_ms = elapsed.as_secs_f64() * 1000.0;
        let memory_mb = (heap_after as i128 - heap_before as i128) as f64 / BYTES_PER_MB;

        trace!(size, time_ms, memory_mb, "sampled");

        Sample {
            point: MeasurementPoint {
                input_size: size,
                time_ms,
                memory_mb,
            },
            output,
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
