//! Deterministic simulation module
//!
//! All flight logic lives here. This module must be pure and deterministic:
//! - Closed-form kinematics only, no numeric integration
//! - Seeded RNG only
//! - Segments walked in travel order
//! - No rendering or platform dependencies

pub mod ball;
pub mod collision;
pub mod kinematics;
pub mod sector;
pub mod segment;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use ball::{Ball, CollisionSearch};
pub use collision::{BounceResponse, reflect_velocity, resolve_bounce};
pub use kinematics::Kinematics;
pub use sector::{Sector, generate_sector, generate_sector_with};
pub use segment::{Segment, SegmentShape};
pub use state::{Hole, HolePhase, RngState};
pub use tick::{HoleEvent, TickInput, tick};
pub use trajectory::{BounceChain, ChainStatus, FlightArc, Impact, plan_trajectory};
