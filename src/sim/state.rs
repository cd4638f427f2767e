//! Hole state
//!
//! One hole is one generated sector plus the ball playing it. The ball's
//! whole flight is planned up front at every strike; real time only selects
//! where along that plan the ball currently is.

use glam::DVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::sector::{Sector, generate_sector};
use super::trajectory::{BounceChain, ChainStatus, plan_trajectory};
use crate::settings::Settings;

/// Current phase of a hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolePhase {
    /// Ball is following its planned bounce chain
    InFlight,
    /// Ball is resting on the terrain
    WaitingForStrike,
    /// Ball left the sector
    OutOfBounds,
    /// Collision search could not place the next impact
    Stalled,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Complete hole state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    /// Seed the sector was generated from
    pub seed: u64,
    pub rng_state: RngState,
    pub settings: Settings,
    pub sector: Sector,
    /// Planned flight since the last strike
    pub chain: BounceChain,
    pub phase: HolePhase,
    /// Strikes taken on this hole
    pub strikes: u32,
    /// Sim time at which `chain` starts
    pub strike_time: f64,
    /// Impacts of `chain` already reported through `tick`
    pub(crate) reported_impacts: usize,
}

impl Hole {
    /// Generate a hole and drop the ball onto it
    pub fn new(seed: u64, settings: Settings) -> Self {
        let rng_state = RngState::new(seed);
        let mut rng = rng_state.to_rng();
        let sector = generate_sector(&settings.terrain, &mut rng);

        let terrain = &settings.terrain;
        let ball = Ball::with_gravity(
            terrain.min_segment_width,
            terrain.max_height,
            settings.physics.gravity,
        );
        let chain = plan_trajectory(&ball, &sector, &settings.physics, &settings.planner);

        log::info!(
            "Hole {}: {} segments over width {}, initial drop {:?}",
            seed,
            sector.len(),
            sector.width(),
            chain.status
        );

        Self {
            seed,
            rng_state,
            settings,
            sector,
            chain,
            phase: HolePhase::InFlight,
            strikes: 0,
            strike_time: 0.0,
            reported_impacts: 0,
        }
    }

    /// Hole with default settings
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Settings::default())
    }

    /// Chain time for sim time `now`
    #[inline]
    pub fn chain_time(&self, now: f64) -> f64 {
        (now - self.strike_time).max(0.0)
    }

    pub fn ball_position(&self, now: f64) -> DVec2 {
        self.chain
            .position_at(self.chain_time(now))
            .unwrap_or(DVec2::ZERO)
    }

    pub fn ball_velocity(&self, now: f64) -> DVec2 {
        self.chain
            .velocity_at(self.chain_time(now))
            .unwrap_or(DVec2::ZERO)
    }

    /// Apply a velocity impulse at sim time `now` and replan the flight.
    ///
    /// The ball keeps its current position; only its velocity changes.
    pub fn strike(&mut self, velocity: DVec2, now: f64) {
        let t = self.chain_time(now);
        let Some(mut ball) = self.chain.ball_at(t) else {
            return;
        };
        ball.reanchor(velocity, 0.0);

        self.replan(ball, now);
        self.strikes += 1;
        log::info!(
            "Strike {} at ({:.1}, {:.1}) with v=({:.2}, {:.2}): {:?}",
            self.strikes,
            ball.initial_position().x,
            ball.initial_position().y,
            velocity.x,
            velocity.y,
            self.chain.status
        );
    }

    /// Plan a fresh chain for `ball` starting at sim time `now`
    pub(crate) fn replan(&mut self, ball: Ball, now: f64) {
        self.chain = plan_trajectory(
            &ball,
            &self.sector,
            &self.settings.physics,
            &self.settings.planner,
        );
        self.strike_time = now;
        self.reported_impacts = 0;
        self.phase = HolePhase::InFlight;
    }

    /// Chain time at which the current chain's outcome takes effect.
    ///
    /// For a ball leaving the sector this is when it crosses the sector edge.
    pub fn outcome_time(&self) -> f64 {
        let Some(last) = self.chain.arcs.last() else {
            return 0.0;
        };
        match self.chain.status {
            ChainStatus::Impossible => {
                let ball = &last.ball;
                let vx = ball.initial_velocity().x;
                let edge = if vx < 0.0 { 0.0 } else { self.sector.width() };
                let exit = if vx == 0.0 { None } else { ball.time_at_x(edge) };
                last.start_time + exit.unwrap_or(0.0).max(0.0)
            }
            _ => self.chain.duration().unwrap_or(last.start_time),
        }
    }
}
