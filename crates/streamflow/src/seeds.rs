// Seed point generation

use crate::config::SeedConfig;
use glam::DVec2;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn generate_rng_seed() -> u64 {
    let mut rng = rand::rng();
    rng.random_range(0..100_000_000u64)
}

pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// `count` lattice nodes drawn uniformly with replacement, `x` in `0..=W-1`, `y` in `0..=H-1`.
///
/// Nodes on the closing row/column are possible and lie outside the integration domain.
pub fn random_seeds(count: usize, rng_seed: u64, width: usize, height: usize) -> Vec<DVec2> {
    let mut rng = StdRng::seed_from_u64(splitmix64(rng_seed));
    (0..count)
        .map(|_| {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            DVec2::new(x as f64, y as f64)
        })
        .collect()
}

/// Evenly spaced seeds covering the domain `[0, W-1) x [0, H-1)`, row by row
pub fn grid_seeds(width: usize, height: usize, spacing: f64) -> Vec<DVec2> {
    let max_x = width.saturating_sub(1) as f64;
    let max_y = height.saturating_sub(1) as f64;
    let mut seeds = Vec::new();

    let mut y = 0.0;
    while y < max_y {
        let mut x = 0.0;
        while x < max_x {
            seeds.push(DVec2::new(x, y));
            x += spacing;
        }
        y += spacing;
    }

    seeds
}

impl SeedConfig {
    /// Resolve to concrete points for a `width x height` field
    pub fn resolve(&self, width: usize, height: usize) -> Vec<DVec2> {
        match self {
            SeedConfig::Random { count, rng_seed } => {
                let rng_seed = rng_seed.unwrap_or_else(|| {
                    let seed = generate_rng_seed();
                    info!("No rng_seed configured, using {}", seed);
                    seed
                });
                random_seeds(*count, rng_seed, width, height)
            }
            SeedConfig::Grid { spacing } => grid_seeds(width, height, *spacing),
            SeedConfig::Points { points } => {
                points.iter().map(|&[x, y]| DVec2::new(x, y)).collect()
            }
        }
    }
}
