//! Continuous sampling of a `VectorField` by bilinear interpolation.

use crate::field::VectorField;
use glam::DVec2;

/// Anything the integrator can pull velocities from
pub trait VelocitySource: Sync {
    /// Velocity at `p`. Callers only ask for points where `contains(p)` holds.
    fn velocity(&self, p: DVec2) -> DVec2;

    /// Whether `p` lies inside the integration domain
    fn contains(&self, p: DVec2) -> bool;

    /// Velocity at `p`, or zero outside the domain
    fn velocity_or_zero(&self, p: DVec2) -> DVec2 {
        if self.contains(p) {
            self.velocity(p)
        } else {
            DVec2::ZERO
        }
    }
}

/// Bilinear view over a borrowed field
#[derive(Clone, Copy, Debug)]
pub struct BilinearSampler<'a> {
    field: &'a VectorField,
}

impl<'a> BilinearSampler<'a> {
    pub fn new(field: &'a VectorField) -> Self {
        Self { field }
    }

    /// Sample at a fractional lattice position.
    ///
    /// `p` must lie in `[0, W-1] x [0, H-1]`. On the closing edge the cell is taken from the
    /// last interior column/row so lattice nodes there still sample exactly.
    pub fn sample(&self, p: DVec2) -> DVec2 {
        debug_assert!(
            self.in_lattice(p),
            "sample point ({}, {}) outside {}x{} lattice",
            p.x,
            p.y,
            self.field.width(),
            self.field.height()
        );
        bilinear(self.field, p)
    }

    fn in_lattice(&self, p: DVec2) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x <= (self.field.width() - 1) as f64
            && p.y <= (self.field.height() - 1) as f64
    }
}

impl VelocitySource for BilinearSampler<'_> {
    fn velocity(&self, p: DVec2) -> DVec2 {
        self.sample(p)
    }

    fn contains(&self, p: DVec2) -> bool {
        self.field.contains(p)
    }
}

fn bilinear(field: &VectorField, p: DVec2) -> DVec2 {
    let (x, y) = (p.x, p.y);

    let x1 = (x.floor() as usize).min(field.width() - 2);
    let y1 = (y.floor() as usize).min(field.height() - 2);
    let (x2, y2) = (x1 + 1, y1 + 1);

    let q11 = field.get(x1, y1);
    let q21 = field.get(x2, y1);
    let q12 = field.get(x1, y2);
    let q22 = field.get(x2, y2);

    let (x1f, x2f) = (x1 as f64, x2 as f64);
    let (y1f, y2f) = (y1 as f64, y2 as f64);

    // Each corner weighted by the area of the opposite sub-rectangle
    (q11 * (x2f - x) * (y2f - y)
        + q21 * (x - x1f) * (y2f - y)
        + q12 * (x2f - x) * (y - y1f)
        + q22 * (x - x1f) * (y - y1f))
        / ((x2f - x1f) * (y2f - y1f))
}
