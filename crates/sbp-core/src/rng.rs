//! Deterministic random sources for the adoption draw.
//!
//! # Determinism strategy
//!
//! Two layouts are supported (see [`RngStrategy`][crate::RngStrategy]):
//!
//! - **Shared** — one [`SimRng`] stream, consumed in ascending
//!   `MunicipalityId` order.  Reproducible as long as the input ordering of
//!   municipalities is stable.
//! - **Per municipality** — each municipality owns a [`MunicipalityRng`]
//!   seeded by:
//!
//!   seed = global_seed XOR (municipality_id * MIXING_CONSTANT)
//!
//!   The mixing constant is the 64-bit fractional part of the golden ratio,
//!   which spreads consecutive IDs uniformly across the seed space.
//!   Municipalities never share RNG state, so the compute phase can run on
//!   any number of threads and still produce identical draws.
//!
//! The decision procedure only sees the [`UniformSource`] trait, which lets
//! tests inject fixed draws.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::MunicipalityId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── UniformSource ─────────────────────────────────────────────────────────────

/// A source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<U: UniformSource + ?Sized> UniformSource for &mut U {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

// ── MunicipalityRng ───────────────────────────────────────────────────────────

/// Per-municipality deterministic RNG.
///
/// Created once per municipality at setup and stored in a parallel `Vec`
/// alongside the municipality store.  Each Rayon worker holds exclusive
/// `&mut` access to the RNGs of the municipalities it evaluates.
pub struct MunicipalityRng(SmallRng);

impl MunicipalityRng {
    /// Seed deterministically from the run's global seed and a municipality ID.
    pub fn new(global_seed: u64, municipality: MunicipalityId) -> Self {
        let seed = global_seed ^ (municipality.0 as u64).wrapping_mul(MIXING_CONSTANT);
        MunicipalityRng(SmallRng::seed_from_u64(seed))
    }
}

impl UniformSource for MunicipalityRng {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG: the single shared stream of the `Shared` strategy.
///
/// Used only in single-threaded contexts; the parallel compute phase uses
/// [`MunicipalityRng`] instead.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }
}

impl UniformSource for SimRng {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}
