//! Deterministic random number generation for world construction.
//!
//! RULE: Nothing that shapes a container's construction-time contents may
//! call a platform RNG. Every container gets its own stream, seeded from
//! (world_seed XOR stable_hash(container_id)). This means:
//!   - Adding or removing a container never changes another's contents.
//!   - A container left untouched by a load rebuilds to the same default.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single container.
pub struct LootRng {
    pub name: String,
    inner: Pcg64Mcg,
}

impl LootRng {
    /// Create a stream from the world seed and a stable key.
    /// The key must never change once content ships.
    pub fn new(world_seed: u64, key: &str) -> Self {
        let derived_seed = world_seed ^ stable_hash(key).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: key.to_string(),
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll a u32 in [lo, hi]. Swaps the bounds if given backwards.
    pub fn range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        lo + self.next_u64_below(u64::from(hi - lo) + 1) as u32
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// FNV-1a over the key's bytes. Stable across builds and platforms,
/// unlike std's hasher.
pub fn stable_hash(key: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME:  u64 = 0x0000_0100_0000_01b3;
    key.bytes().fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}
