//! Streamline tracing through a velocity source.
//!
//! Two schemes share one integrator. They differ in how they treat the domain edge:
//!
//! * `Euler` checks the current point before every step and stops once it has left the
//!   domain. The point that crossed the edge is kept as the last point.
//! * `Rk4` never stops early. Stage evaluations outside the domain read as zero velocity, so a
//!   particle that has left keeps repeating its last position until the step budget runs out.

use crate::sampler::VelocitySource;
use glam::DVec2;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Euler,
    Rk4,
}

impl Scheme {
    pub const ALL: [Scheme; 2] = [Scheme::Euler, Scheme::Rk4];

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Euler => "euler",
            Scheme::Rk4 => "rk4",
        }
    }

    /// Position after a single step of size `h` from `p`.
    ///
    /// Euler reads the source directly, so `p` must be inside the domain. RK4 tolerates any `p`.
    pub fn advance<S: VelocitySource + ?Sized>(self, source: &S, p: DVec2, h: f64) -> DVec2 {
        match self {
            Scheme::Euler => p + source.velocity(p) * h,
            Scheme::Rk4 => {
                let f = |q: DVec2| source.velocity_or_zero(q);
                let k1 = f(p);
                let k2 = f(p + k1 * (0.5 * h));
                let k3 = f(p + k2 * (0.5 * h));
                let k4 = f(p + k3 * h);
                p + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * h / 6.0
            }
        }
    }

    fn halts_outside(self) -> bool {
        matches!(self, Scheme::Euler)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a streamline ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every requested step was taken and the particle is still inside
    BudgetExhausted,
    /// The last point lies outside the domain
    LeftDomain,
}

/// One particle trajectory, seed first
#[derive(Debug, Clone, PartialEq)]
pub struct Streamline {
    pub scheme: Scheme,
    pub points: Vec<DVec2>,
    pub termination: Termination,
}

impl Streamline {
    pub fn seed(&self) -> DVec2 {
        self.points[0]
    }

    pub fn end(&self) -> DVec2 {
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true: a streamline always holds at least its seed
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Polyline length
    pub fn arc_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Distance between the two end points
    pub fn endpoint_distance(&self, other: &Streamline) -> f64 {
        self.end().distance(other.end())
    }
}

/// Upper bound on the points reserved before tracing; longer streamlines grow as they go
const PREALLOCATED_POINTS: usize = 4096;

/// Fixed-step streamline integrator over a borrowed velocity source
pub struct StreamlineIntegrator<'a, S: VelocitySource + ?Sized> {
    source: &'a S,
    scheme: Scheme,
    step_size: f64,
    steps: usize,
}

impl<'a, S: VelocitySource + ?Sized> StreamlineIntegrator<'a, S> {
    pub fn new(source: &'a S, scheme: Scheme, step_size: f64, steps: usize) -> Self {
        Self {
            source,
            scheme,
            step_size,
            steps,
        }
    }

    /// Trace a single streamline from `seed`. Holds at most `steps + 1` points.
    pub fn trace(&self, seed: DVec2) -> Streamline {
        let mut points = Vec::with_capacity(self.steps.saturating_add(1).min(PREALLOCATED_POINTS));
        points.push(seed);

        let mut p = seed;
        for _ in 0..self.steps {
            if self.scheme.halts_outside() && !self.source.contains(p) {
                break;
            }
            p = self.scheme.advance(self.source, p, self.step_size);
            points.push(p);
        }

        let termination = if self.source.contains(p) {
            Termination::BudgetExhausted
        } else {
            Termination::LeftDomain
        };

        Streamline {
            scheme: self.scheme,
            points,
            termination,
        }
    }

    /// Trace every seed independently, in parallel. Output order follows `seeds`.
    pub fn trace_all(&self, seeds: &[DVec2]) -> Vec<Streamline> {
        let streamlines: Vec<Streamline> = seeds.par_iter().map(|&seed| self.trace(seed)).collect();

        let left = streamlines
            .iter()
            .filter(|s| s.termination == Termination::LeftDomain)
            .count();
        debug!(
            "{} h={} n={}: traced {} streamlines, {} left the domain",
            self.scheme,
            self.step_size,
            self.steps,
            streamlines.len(),
            left
        );

        streamlines
    }
}
