//! Workload generators for hit-rate benchmarks.
//!
//! Deterministic key streams: same parameters and seed, same sequence.

use cachemux::traits::CachePolicy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

#[derive(Debug, Clone, Copy)]
pub enum Workload {
    /// Uniform random keys in `[0, universe)`.
    Uniform,
    /// Hot/cold split: `hot_prob` of accesses land in the first
    /// `hot_fraction` of the universe.
    Hotset { hot_fraction: f64, hot_prob: f64 },
    /// Sequential scan over `[0, universe)`, wrapping.
    Scan,
    /// Zipfian-distributed keys; `exponent` 1.0 is the classic skew.
    Zipfian { exponent: f64 },
}

#[derive(Debug, Clone, Copy)]
pub struct WorkloadSpec {
    pub universe: u64,
    pub workload: Workload,
    pub seed: u64,
}

impl WorkloadSpec {
    pub fn generator(self) -> WorkloadGenerator {
        WorkloadGenerator::new(self.universe, self.workload, self.seed)
    }
}

#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    universe: u64,
    workload: Workload,
    rng: SmallRng,
    scan_pos: u64,
    zipfian: Option<Zipf<f64>>,
}

impl WorkloadGenerator {
    pub fn new(universe: u64, workload: Workload, seed: u64) -> Self {
        let universe = universe.max(1);
        let zipfian = match workload {
            Workload::Zipfian { exponent } => Some(Zipf::new(universe as f64, exponent).unwrap()),
            _ => None,
        };
        Self {
            universe,
            workload,
            rng: SmallRng::seed_from_u64(seed),
            scan_pos: 0,
            zipfian,
        }
    }

    pub fn next_key(&mut self) -> u64 {
        match self.workload {
            Workload::Uniform => self.rng.random::<u64>() % self.universe,

            Workload::Hotset {
                hot_fraction,
                hot_prob,
            } => {
                let hot_fraction = hot_fraction.clamp(0.0, 1.0);
                let hot_prob = hot_prob.clamp(0.0, 1.0);
                let hot_size = (((self.universe as f64) * hot_fraction).round() as u64)
                    .clamp(1, self.universe);
                if self.rng.random::<f64>() < hot_prob {
                    self.rng.random::<u64>() % hot_size
                } else if hot_size == self.universe {
                    self.rng.random::<u64>() % self.universe
                } else {
                    hot_size + (self.rng.random::<u64>() % (self.universe - hot_size))
                }
            },

            Workload::Scan => {
                let key = self.scan_pos;
                self.scan_pos = (self.scan_pos + 1) % self.universe;
                key
            },

            Workload::Zipfian { .. } => {
                let zipf = self.zipfian.as_ref().unwrap();
                let sample: f64 = zipf.sample(&mut self.rng);
                (sample as u64).saturating_sub(1).min(self.universe - 1)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HitRate {
    pub hits: u64,
    pub misses: u64,
}

impl HitRate {
    pub fn hit_rate(self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Drives a lookup-then-insert-on-miss loop against a cache.
pub fn run_hit_rate<C>(
    cache: &mut C,
    generator: &mut WorkloadGenerator,
    operations: usize,
) -> HitRate
where
    C: CachePolicy<u64, u64>,
{
    let mut hits = 0u64;
    let mut misses = 0u64;

    for _ in 0..operations {
        let key = generator.next_key();
        if cache.get(&key).is_some() {
            hits += 1;
        } else {
            misses += 1;
            cache.put(key, key);
        }
    }

    HitRate { hits, misses }
}
