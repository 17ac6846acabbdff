// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Seeded random source and the scalar distributions used during growth.

One `StdRng` is created per run and passed by `&mut` into every stochastic
operation, so a fixed seed reproduces a culture exactly.
*/

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Create the run RNG, deriving a seed from the clock when none is given
///
/// Returns the generator together with the seed actually used.
pub fn seeded_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(clock_seed);
    (StdRng::seed_from_u64(seed), seed)
}

fn clock_seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_micros().unsigned_abs()
}

/// Uniform draw in `[low, high)`; degenerate ranges return `low`
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Gaussian draw; a non-positive `std` returns the mean
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std: f64) -> f64 {
    if std <= 0.0 {
        return mean;
    }
    match Normal::new(mean, std) {
        Ok(normal) => normal.sample(rng),
        Err(_) => mean,
    }
}

/// Rayleigh draw by inverse CDF
pub fn rayleigh<R: Rng + ?Sized>(rng: &mut R, sigma: f64) -> f64 {
    let u: f64 = rng.gen();
    sigma * (-2.0 * (1.0 - u).ln()).sqrt()
}
