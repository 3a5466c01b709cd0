//! Multi-thread measurement harness over the concurrent policy interface.
//!
//! Two drivers, consuming nothing but [`ConcurrentPolicy`]:
//!
//! - [`run_random`]: uniform keys, a configurable get/put mix, N threads.
//! - [`run_mixed`]: scan / hotspot / scan phases per thread, modeling a
//!   working set disturbed by sequential sweeps.
//!
//! Every operation is timed individually with `Instant`; per-thread samples
//! are merged into a [`CacheStats`] with mean and standard deviation.

use std::thread;
use std::time::Instant;

use cachemux::traits::ConcurrentPolicy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Merged measurement results for one harness run.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub total_ops: u64,
    pub total_get: u64,
    pub total_put: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Hit share of gets, in percent.
    pub hit_rate: f64,
    /// Miss share of gets, in percent.
    pub miss_rate: f64,
    pub ops_per_sec: f64,
    /// Mean per-operation latency, nanoseconds.
    pub avg_access_ns: f64,
    /// Standard deviation of per-operation latency, nanoseconds.
    pub stddev_ns: f64,
    /// Wall time of the whole run, milliseconds.
    pub elapsed_ms: f64,
}

#[derive(Default)]
struct ThreadStats {
    gets: u64,
    puts: u64,
    hits: u64,
    misses: u64,
    times_ns: Vec<f64>,
}

impl ThreadStats {
    fn with_capacity(ops: usize) -> Self {
        ThreadStats {
            times_ns: Vec::with_capacity(ops),
            ..Default::default()
        }
    }

    #[inline]
    fn measured_get<C>(&mut self, cache: &C, key: u64)
    where
        C: ConcurrentPolicy<u64, u64> + ?Sized,
    {
        let t0 = Instant::now();
        let hit = cache.get(&key).is_some();
        self.times_ns.push(t0.elapsed().as_nanos() as f64);
        self.gets += 1;
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    #[inline]
    fn measured_put<C>(&mut self, cache: &C, key: u64, value: u64)
    where
        C: ConcurrentPolicy<u64, u64> + ?Sized,
    {
        let t0 = Instant::now();
        cache.put(key, value);
        self.times_ns.push(t0.elapsed().as_nanos() as f64);
        self.puts += 1;
    }
}

/// Random pattern: each of `threads` threads performs
/// `total_ops / threads` operations on uniform keys in `[0, key_range)`;
/// each operation is a get with probability `get_ratio`, a put otherwise.
pub fn run_random<C>(
    cache: &C,
    key_range: u64,
    total_ops: usize,
    get_ratio: f64,
    threads: usize,
) -> CacheStats
where
    C: ConcurrentPolicy<u64, u64> + ?Sized,
{
    let threads = threads.max(1);
    let key_range = key_range.max(1);
    let ops_per_thread = total_ops / threads;

    run_threads(cache, threads, |tid| {
        move |cache: &C| {
            let mut rng = SmallRng::seed_from_u64(0x9e37_79b9 ^ (tid as u64));
            let mut stats = ThreadStats::with_capacity(ops_per_thread);
            for i in 0..ops_per_thread {
                let key = rng.random::<u64>() % key_range;
                if rng.random::<f64>() < get_ratio {
                    stats.measured_get(cache, key);
                } else {
                    stats.measured_put(cache, key, i as u64);
                }
            }
            stats
        }
    })
}

/// Mixed pattern, per thread: phase A scans `0..scan_range` with gets,
/// phase B performs `hotspot_accesses` operations on uniform keys in
/// `[0, hotspot_range)` with a `put_ratio` share of puts, phase C repeats
/// the scan.
pub fn run_mixed<C>(
    cache: &C,
    scan_range: u64,
    hotspot_range: u64,
    hotspot_accesses: usize,
    put_ratio: f64,
    threads: usize,
) -> CacheStats
where
    C: ConcurrentPolicy<u64, u64> + ?Sized,
{
    let threads = threads.max(1);
    let hotspot_range = hotspot_range.max(1);

    run_threads(cache, threads, |tid| {
        move |cache: &C| {
            let mut rng = SmallRng::seed_from_u64(0x51_7cc1 ^ (tid as u64));
            let ops = scan_range as usize * 2 + hotspot_accesses;
            let mut stats = ThreadStats::with_capacity(ops);

            for key in 0..scan_range {
                stats.measured_get(cache, key);
            }

            for i in 0..hotspot_accesses {
                let key = rng.random::<u64>() % hotspot_range;
                if put_ratio > 0.0 && rng.random::<f64>() < put_ratio {
                    stats.measured_put(cache, key, i as u64);
                } else {
                    stats.measured_get(cache, key);
                }
            }

            for key in 0..scan_range {
                stats.measured_get(cache, key);
            }

            stats
        }
    })
}

/// Spawns the per-thread workers, joins them, and merges their stats.
fn run_threads<C, W>(
    cache: &C,
    threads: usize,
    make_worker: impl Fn(usize) -> W,
) -> CacheStats
where
    C: ConcurrentPolicy<u64, u64> + ?Sized,
    W: for<'c> FnOnce(&'c C) -> ThreadStats + Send,
{
    let start = Instant::now();
    let per_thread: Vec<ThreadStats> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|tid| {
                let worker = make_worker(tid);
                scope.spawn(move || worker(cache))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("harness worker panicked"))
            .collect()
    });

    merge(per_thread, start.elapsed().as_secs_f64())
}

fn merge(per_thread: Vec<ThreadStats>, elapsed_secs: f64) -> CacheStats {
    let mut stats = CacheStats::default();
    let mut all_ns: Vec<f64> = Vec::new();

    for thread_stats in per_thread {
        stats.total_get += thread_stats.gets;
        stats.total_put += thread_stats.puts;
        stats.cache_hits += thread_stats.hits;
        stats.cache_misses += thread_stats.misses;
        all_ns.extend(thread_stats.times_ns);
    }
    stats.total_ops = stats.total_get + stats.total_put;

    if stats.total_get > 0 {
        stats.hit_rate = 100.0 * stats.cache_hits as f64 / stats.total_get as f64;
        stats.miss_rate = 100.0 * stats.cache_misses as f64 / stats.total_get as f64;
    }

    stats.elapsed_ms = elapsed_secs * 1_000.0;
    if elapsed_secs > 0.0 {
        stats.ops_per_sec = stats.total_ops as f64 / elapsed_secs;
    }

    if !all_ns.is_empty() {
        let mean = all_ns.iter().sum::<f64>() / all_ns.len() as f64;
        let variance =
            all_ns.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / all_ns.len() as f64;
        stats.avg_access_ns = mean;
        stats.stddev_ns = variance.sqrt();
    }

    stats
}
