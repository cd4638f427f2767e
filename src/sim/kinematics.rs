//! Closed-form motion along one axis under constant acceleration
//!
//! Times are measured from the instant the pair was established (the last
//! re-anchor), never absolute. Negative times are accepted so root finding
//! can report crossings that happened "in the past".

use serde::{Deserialize, Serialize};

/// Initial velocity and constant acceleration for a single axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    pub v0: f64,
    pub accel: f64,
}

impl Kinematics {
    pub const fn new(v0: f64, accel: f64) -> Self {
        Self { v0, accel }
    }

    /// Displacement since the origin instant
    #[inline]
    pub fn position(&self, t: f64) -> f64 {
        self.v0 * t + self.accel * t * t / 2.0
    }

    #[inline]
    pub fn velocity(&self, t: f64) -> f64 {
        self.v0 + self.accel * t
    }

    /// Elapsed times at which the displacement equals `d`, as `(t1, t2)`
    /// with `t1 <= t2`.
    ///
    /// With zero acceleration there is one crossing and it is returned twice.
    /// `None` means the displacement is never reached: a negative
    /// discriminant, or a body at rest asked to move.
    pub fn time_for_displacement(&self, d: f64) -> Option<(f64, f64)> {
        if self.accel == 0.0 {
            if self.v0 == 0.0 {
                return (d == 0.0).then_some((0.0, 0.0));
            }
            let t = d / self.v0;
            return Some((t, t));
        }

        // a/2 t² + v0 t - d = 0
        let a = self.accel / 2.0;
        let b = self.v0;
        let c = -d;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }

        // Pick the sign that avoids cancellation between b and sqrt(disc)
        let q = -0.5 * (b + b.signum() * disc.sqrt());
        let (r1, r2) = if q == 0.0 {
            // b == 0 and disc == 0, which forces d == 0
            (0.0, 0.0)
        } else {
            (q / a, c / q)
        };

        Some((r1.min(r2), r1.max(r2)))
    }
}
