//! Synthetic velocity sources for demos and tests.

use crate::error::FieldResult;
use crate::field::VectorField;
use crate::sampler::VelocitySource;
use glam::DVec2;
use noise::{NoiseFn, Perlin};

/// Divergence-free wind built from the curl of a Perlin potential.
///
/// The potential `psi` is smooth, so the field varies slowly at low frequencies.
/// Velocity is `(d psi / dy, -d psi / dx)`.
#[derive(Debug, Clone)]
pub struct NoiseField {
    perlin: Perlin,
    frequency: f64,
    amplitude: f64,
}

impl NoiseField {
    /// Central-difference step in lattice units
    pub const EPSILON: f64 = 1e-4;

    pub fn new(seed: u32, frequency: f64, amplitude: f64) -> Self {
        Self {
            perlin: Perlin::new(seed),
            frequency,
            amplitude,
        }
    }

    pub fn potential(&self, p: DVec2) -> f64 {
        self.perlin.get([p.x * self.frequency, p.y * self.frequency]) * self.amplitude
    }

    pub fn velocity_at(&self, p: DVec2) -> DVec2 {
        let dx = DVec2::new(Self::EPSILON, 0.0);
        let dy = DVec2::new(0.0, Self::EPSILON);
        let dpsi_dx = (self.potential(p + dx) - self.potential(p - dx)) / (2.0 * Self::EPSILON);
        let dpsi_dy = (self.potential(p + dy) - self.potential(p - dy)) / (2.0 * Self::EPSILON);
        DVec2::new(dpsi_dy, -dpsi_dx)
    }

    /// Sample onto a `width x height` lattice
    pub fn to_field(&self, width: usize, height: usize) -> FieldResult<VectorField> {
        VectorField::from_fn(width, height, |x, y| self.velocity_at(DVec2::new(x as f64, y as f64)))
    }
}

/// Closed-form velocity over an explicit rectangular domain `[min, max)`
pub struct Analytic<F> {
    min: DVec2,
    max: DVec2,
    f: F,
}

impl<F> Analytic<F>
where
    F: Fn(DVec2) -> DVec2 + Sync,
{
    pub fn new(min: DVec2, max: DVec2, f: F) -> Self {
        Self { min, max, f }
    }
}

impl<F> VelocitySource for Analytic<F>
where
    F: Fn(DVec2) -> DVec2 + Sync,
{
    fn velocity(&self, p: DVec2) -> DVec2 {
        (self.f)(p)
    }

    fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x < self.max.x && p.y < self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_field_is_reproducible() {
        let a = NoiseField::new(7, 0.1, 3.0).to_field(12, 9).unwrap();
        let b = NoiseField::new(7, 0.1, 3.0).to_field(12, 9).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.width(), 12);
        assert_eq!(a.height(), 9);
    }

    #[test]
    fn test_noise_field_is_divergence_free() {
        let noise = NoiseField::new(42, 0.15, 4.0);
        let d = NoiseField::EPSILON;
        for p in [DVec2::new(3.3, 4.1), DVec2::new(10.7, 2.2), DVec2::new(0.4, 17.9)] {
            let (dx, dy) = (DVec2::new(d, 0.0), DVec2::new(0.0, d));
            let dvx = noise.velocity_at(p + dx).x - noise.velocity_at(p - dx).x;
            let dvy = noise.velocity_at(p + dy).y - noise.velocity_at(p - dy).y;
            let divergence = (dvx + dvy) / (2.0 * d);
            assert!(divergence.abs() < 1e-6, "divergence {divergence} at {p:?}");
        }
    }

    #[test]
    fn test_zero_amplitude_is_calm() {
        let field = NoiseField::new(1, 0.2, 0.0).to_field(5, 5).unwrap();
        assert_eq!(field.max_magnitude(), 0.0);
    }

    #[test]
    fn test_analytic_domain_is_half_open() {
        let source = Analytic::new(DVec2::ZERO, DVec2::new(4.0, 2.0), |_| DVec2::X);
        assert!(source.contains(DVec2::new(0.0, 0.0)));
        assert!(!source.contains(DVec2::new(4.0, 1.0)));
        assert!(!source.contains(DVec2::new(1.0, 2.0)));
        assert_eq!(source.velocity_or_zero(DVec2::new(1.0, 1.0)), DVec2::X);
        assert_eq!(source.velocity_or_zero(DVec2::new(-1.0, 1.0)), DVec2::ZERO);
    }
}
