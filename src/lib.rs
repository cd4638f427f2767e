//! Sector Golf - projectile flight over procedurally generated terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, terrain, collision search, bounce chains)
//! - `renderer`: Vertex geometry for a presentation layer (no GPU work happens here)
//! - `settings`: Physics, terrain and planner configuration
//! - `error`: Configuration and validation errors

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{PhysicsConfig, PlannerLimits, Settings, TerrainConfig};

/// Simulation constants shared by the core and its drivers
pub mod consts {
    /// Downward acceleration applied to vertical kinematics (units/s²)
    pub const G: f64 = -9.8;

    /// Sim seconds per wall-clock second. Applied by the presentation layer only.
    pub const TIME_SCALE: f64 = 15.0;

    /// Velocity added per directional nudge (the arrow-key impulse)
    pub const NUDGE_SPEED: f64 = 10.0;

    /// Gap kept between the tallest terrain and the top of the playfield
    pub const STRUCTURE_CEILING_GAP: f64 = 20.0;

    /// Upper bound on bisection steps per segment
    pub const MAX_BISECTION_STEPS: u32 = 200;
}

/// Sign of a horizontal velocity as a walk direction (+1 right, -1 left)
#[inline]
pub fn travel_direction(vx: f64) -> i32 {
    if vx < 0.0 { -1 } else { 1 }
}

/// Clamp `value` into `[min, max]` without panicking on inverted bounds
#[inline]
pub fn constrain(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
