//! Bounce response off sloped terrain
//!
//! Reflection is done on the tangent line at the impact point and keeps the
//! incoming speed. Energy loss (restitution, then a fixed friction
//! decrement on the horizontal component) is applied afterwards, followed
//! by per-axis rest detection.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::settings::PhysicsConfig;

/// Result of a bounce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceResponse {
    /// Velocity leaving the surface
    pub velocity: DVec2,
    /// Horizontal speed fell to the friction threshold and was zeroed
    pub x_paused: bool,
    /// Vertical speed fell to the rest threshold and was zeroed
    pub y_paused: bool,
}

impl BounceResponse {
    /// Ball is fully at rest and waiting for the next strike
    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.x_paused && self.y_paused
    }
}

/// Reflect `velocity` across a surface tangent of the given `slope`.
///
/// Speed is preserved. Flat and vertical surfaces are special-cased. A purely
/// vertical incoming velocity goes through `atan2`, which is defined there,
/// so a ball dropped straight onto a ramp deflects down the ramp.
pub fn reflect_velocity(velocity: DVec2, slope: f64) -> DVec2 {
    if slope == 0.0 {
        return DVec2::new(velocity.x, -velocity.y);
    }
    if slope.is_infinite() {
        return DVec2::new(-velocity.x, velocity.y);
    }

    let speed = velocity.x.hypot(velocity.y);
    if speed == 0.0 {
        return DVec2::ZERO;
    }

    let slope_angle = slope.atan();
    let velocity_angle = velocity.y.atan2(velocity.x);
    let reflected = 2.0 * slope_angle - velocity_angle;

    DVec2::new(reflected.cos(), reflected.sin()) * speed
}

/// Full bounce: reflect, lose energy, then decide which axes have stopped
pub fn resolve_bounce(velocity: DVec2, slope: f64, physics: &PhysicsConfig) -> BounceResponse {
    let reflected = reflect_velocity(velocity, slope);
    let mut out = reflected * physics.restitution;

    out.x -= physics.kinetic_friction.copysign(out.x);

    let x_paused = out.x.abs() <= physics.kinetic_friction;
    if x_paused {
        out.x = 0.0;
    }
    let y_paused = out.y.abs() <= physics.min_vertical_velocity;
    if y_paused {
        out.y = 0.0;
    }

    BounceResponse {
        velocity: out,
        x_paused,
        y_paused,
    }
}
