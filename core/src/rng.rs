//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through SeededRng instances derived
//! from the single master seed of the run.
//!
//! Every customer gets its own stream, seeded from
//! (master_seed XOR scrambled stream index). This means:
//!   - A customer's profile is reproducible in isolation.
//!   - Changing one persona's population count never changes the
//!     draws of a customer that keeps its ordinal.

use rand::{seq::index, Rng, RngCore, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;

/// Customer streams start here so they never collide with named slots.
const CUSTOMER_STREAM_BASE: u64 = 1 << 32;

/// A named, deterministic RNG stream.
pub struct SeededRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SeededRng {
    /// Create a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Roll a u64 in [0, n). Panics if `n == 0`.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        self.inner.gen_range(0..n)
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll a float in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Sample N(mean, std_dev). A zero std_dev returns `mean` exactly.
    /// A negative or non-finite std_dev yields NaN, which the engine's
    /// finiteness check rejects.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.inner),
            Err(_) => f64::NAN,
        }
    }

    /// Pick `k` distinct indices from `0..n`, uniformly, without replacement.
    /// Callers guarantee `k <= n`.
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        index::sample(&mut self.inner, n, k).into_vec()
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// All RNG streams for a single run, derived from one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: RngSlot) -> SeededRng {
        SeededRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }

    /// The stream owned by the customer with the given 1-based ordinal.
    /// Generator and Q backfill both draw from it, in that order.
    pub fn for_customer(&self, ordinal: u64) -> SeededRng {
        SeededRng::new(self.master_seed, CUSTOMER_STREAM_BASE + ordinal).with_name("customer")
    }
}

/// Stable named stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Overview = 0,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
        }
    }
}
