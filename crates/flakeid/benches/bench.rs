use core::{hint::black_box, time::Duration};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeid::{
    AlphabetEncoder, AtomicGenerator, Base32Encoder, BitLayout, Config, Encoder, EntityRegistry,
    HexEncoder, IdGenStatus, IdGenerator, LockGenerator, MonotonicClock, PublicIds, TimeSource,
    Topology,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn now_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// A layout whose sequence never runs out within one fixed millisecond.
fn wide_sequence_config() -> Config {
    Config::new(Topology::new(1, 1, 1))
        .with_epoch(Duration::ZERO)
        .with_layout(BitLayout::new(30, 4, 3, 5, 22).expect("valid layout"))
}

fn default_config() -> Config {
    Config::new(Topology::new(1, 1, 1))
}

fn thread_counts() -> Vec<usize> {
    let mut counts = vec![1, 2, 4, 8, num_cpus::get()];
    counts.sort_unstable();
    counts.dedup();
    counts
}

/// Benchmarks a hot-path generator where polls are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: IdGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id() {
                        Ok(IdGenStatus::Ready { id }) => {
                            black_box(id);
                        }
                        _ => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks the blocking `generate` path against a real clock, including
/// waits at millisecond boundaries.
fn bench_generate<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: IdGenerator,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.generate().expect("generate"));
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_generator_contended<G>(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> G)
where
    G: IdGenerator + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);

    for thread_count in thread_counts() {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements((ids_per_thread * thread_count) as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let generator = Arc::new(generator_fn());
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let generator = Arc::clone(&generator);
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(generator.generate().expect("generate"));
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

fn bench_encoder<E>(c: &mut Criterion, encoder: E)
where
    E: Encoder,
{
    let mut group = c.benchmark_group(format!("encoding/{}", encoder.name()));
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let ids: Vec<u64> = (0..TOTAL_IDS as u64)
        .map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .collect();
    let encoded: Vec<String> = ids.iter().map(|&id| encoder.encode(id)).collect();

    group.bench_function("encode", |b| {
        b.iter(|| {
            for &id in &ids {
                black_box(encoder.encode(black_box(id)));
            }
        });
    });
    group.bench_function("decode", |b| {
        b.iter(|| {
            for s in &encoded {
                black_box(encoder.decode(black_box(s)).expect("decode"));
            }
        });
    });

    group.finish();
}

// --- MOCK CLOCK (fixed, non-advancing time) ---

fn benchmark_mock_sequential_lock(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/lock", || {
        LockGenerator::new(wide_sequence_config(), FixedMockTime { millis: 1 })
            .expect("valid config")
    });
}

fn benchmark_mock_sequential_atomic(c: &mut Criterion) {
    bench_generator(c, "mock/sequential/atomic", || {
        AtomicGenerator::new(wide_sequence_config(), FixedMockTime { millis: 1 })
            .expect("valid config")
    });
}

/// Measures raw contention; the atomic generator retries lost CAS races.
fn benchmark_mock_contended_lock(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/lock", || {
        LockGenerator::new(wide_sequence_config(), FixedMockTime { millis: 1 })
            .expect("valid config")
    });
}

fn benchmark_mock_contended_atomic(c: &mut Criterion) {
    bench_generator_contended(c, "mock/contended/atomic", || {
        AtomicGenerator::new(wide_sequence_config(), FixedMockTime { millis: 1 })
            .expect("valid config")
    });
}

// --- MONOTONIC CLOCK (realistic time, blocks at sequence exhaustion) ---

fn benchmark_mono_sequential_lock(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generate(c, "mono/sequential/lock", || {
        LockGenerator::new(default_config(), clock.clone()).expect("valid config")
    });
}

fn benchmark_mono_sequential_atomic(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generate(c, "mono/sequential/atomic", || {
        AtomicGenerator::new(default_config(), clock.clone()).expect("valid config")
    });
}

fn benchmark_mono_threaded_lock(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_contended(c, "mono/threaded/lock", || {
        LockGenerator::new(default_config(), clock.clone()).expect("valid config")
    });
}

fn benchmark_mono_threaded_atomic(c: &mut Criterion) {
    let clock = MonotonicClock::default();
    bench_generator_contended(c, "mono/threaded/atomic", || {
        AtomicGenerator::new(default_config(), clock.clone()).expect("valid config")
    });
}

// --- ENCODING ---

fn benchmark_encoders(c: &mut Criterion) {
    bench_encoder(c, AlphabetEncoder::base62());
    bench_encoder(c, HexEncoder);
    bench_encoder(c, Base32Encoder);
}

fn benchmark_public_ids(c: &mut Criterion) {
    let mut registry = EntityRegistry::new(7);
    registry.register("user", 1, "usr").expect("register");
    let public = PublicIds::new(registry, AlphabetEncoder::base62());
    let user = public.registry().get("user").expect("registered").clone();

    let mut group = c.benchmark_group("encoding/public");
    group.bench_function("round_trip", |b| {
        b.iter(|| {
            let s = public.encode(black_box(0x0123_4567_89AB_CDEF), &user);
            black_box(public.decode(&s).expect("decode"));
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    // Mock clock
    benchmark_mock_sequential_lock,
    benchmark_mock_sequential_atomic,
    benchmark_mock_contended_lock,
    benchmark_mock_contended_atomic, // retries because of CAS failures
    // Monotonic clock (blocking)
    benchmark_mono_sequential_lock,
    benchmark_mono_sequential_atomic,
    benchmark_mono_threaded_lock,
    benchmark_mono_threaded_atomic,
    // Encoding
    benchmark_encoders,
    benchmark_public_ids,
);
criterion_main!(benches);
