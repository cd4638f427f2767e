//! Bounce-chain planning
//!
//! From a freshly struck ball, repeatedly search for the next impact and
//! resolve the bounce until the ball rests, leaves the playfield, or a safety
//! bound trips. The resulting chain of flight arcs can be replayed as a pure
//! function of elapsed time without recomputing anything.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ball::{Ball, CollisionSearch};
use super::collision::resolve_bounce;
use super::sector::Sector;
use crate::settings::{PhysicsConfig, PlannerLimits};

/// How a bounce chain ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainStatus {
    /// Ball came to rest; waiting for the next strike
    WaitingForStrike,
    /// Ball left the playfield; the last arc never ends
    Impossible,
    /// Arc count or elapsed-time bound reached before the ball settled
    Truncated,
    /// Collision search failed to converge (ill-formed geometry)
    Stalled,
}

/// One flight between impulses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightArc {
    /// Ball state anchored at the start of this arc
    pub ball: Ball,
    /// Chain time at which this arc begins
    pub start_time: f64,
    /// Chain time of the impact that ends this arc (`None` if it never lands)
    pub end_time: Option<f64>,
    /// Segment struck at `end_time`
    pub impact_segment: Option<usize>,
}

impl FlightArc {
    fn open(ball: Ball, start_time: f64) -> Self {
        Self {
            ball,
            start_time,
            end_time: None,
            impact_segment: None,
        }
    }

    /// Check if chain time `t` falls inside this arc
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && self.end_time.is_none_or(|end| t < end)
    }

    /// Zero-length arc: the ball is resting
    pub fn is_resting(&self) -> bool {
        self.end_time == Some(self.start_time)
    }
}

/// An impact along the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Impact {
    pub time: f64,
    pub position: DVec2,
    pub segment: usize,
}

/// Ordered flight arcs from one strike to rest or departure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BounceChain {
    pub arcs: Vec<FlightArc>,
    pub status: ChainStatus,
}

impl BounceChain {
    /// Arc in flight at chain time `t` (the last arc once the chain is over)
    pub fn arc_at(&self, t: f64) -> Option<&FlightArc> {
        let t = t.max(0.0);
        self.arcs
            .iter()
            .find(|arc| arc.contains(t))
            .or_else(|| self.arcs.last())
    }

    /// Ball position at chain time `t`
    pub fn position_at(&self, t: f64) -> Option<DVec2> {
        self.arc_at(t)
            .map(|arc| arc.ball.position_at(self.local_time(arc, t)))
    }

    /// Ball velocity at chain time `t`
    pub fn velocity_at(&self, t: f64) -> Option<DVec2> {
        self.arc_at(t).map(|arc| {
            if arc.is_resting() {
                DVec2::ZERO
            } else {
                arc.ball.velocity_at(self.local_time(arc, t))
            }
        })
    }

    /// Ball re-anchored at chain time `t`, carrying its velocity there
    pub fn ball_at(&self, t: f64) -> Option<Ball> {
        let arc = self.arc_at(t)?;
        let velocity = self.velocity_at(t)?;
        let mut ball = arc.ball;
        ball.reanchor(velocity, self.local_time(arc, t));
        Some(ball)
    }

    /// Chain time of the last impact (`None` if the ball never lands)
    pub fn duration(&self) -> Option<f64> {
        match self.status {
            ChainStatus::Impossible => None,
            _ => self.arcs.iter().rev().find_map(|arc| arc.end_time),
        }
    }

    /// Ball has settled for good by chain time `t`
    pub fn is_settled_at(&self, t: f64) -> bool {
        self.status == ChainStatus::WaitingForStrike && self.duration().is_some_and(|d| t >= d)
    }

    /// Every impact in order
    pub fn impacts(&self) -> Vec<Impact> {
        self.arcs
            .iter()
            .filter_map(|arc| {
                let end = arc.end_time?;
                let segment = arc.impact_segment?;
                Some(Impact {
                    time: end,
                    position: arc.ball.position_at(end - arc.start_time),
                    segment,
                })
            })
            .collect()
    }

    // A resting ball stays where it landed
    fn local_time(&self, arc: &FlightArc, t: f64) -> f64 {
        let t = t.max(arc.start_time);
        match arc.end_time {
            Some(end) => t.min(end) - arc.start_time,
            None => t - arc.start_time,
        }
    }
}

/// Resolve the whole multi-bounce flight of `ball` over `sector`
pub fn plan_trajectory(
    ball: &Ball,
    sector: &Sector,
    physics: &PhysicsConfig,
    limits: &PlannerLimits,
) -> BounceChain {
    let mut arcs = vec![FlightArc::open(*ball, 0.0)];
    let mut current = *ball;
    let mut elapsed = 0.0;

    let status = loop {
        if arcs.len() >= limits.max_arcs || elapsed >= limits.max_elapsed {
            log::warn!(
                "Bounce chain truncated after {} arcs at t={:.3}",
                arcs.len(),
                elapsed
            );
            break ChainStatus::Truncated;
        }

        let (dt, segment) = match current.find_collision(sector, 0.0, physics.height_precision) {
            CollisionSearch::Hit { time, segment } => (time, segment),
            CollisionSearch::Miss => break ChainStatus::Impossible,
            CollisionSearch::NoConvergence { .. } => break ChainStatus::Stalled,
        };

        elapsed += dt;
        let impact_x = current.x_at(dt);
        let slope = sector.segments()[segment].slope_at(impact_x);
        let response = resolve_bounce(current.velocity_at(dt), slope, physics);

        if let Some(last) = arcs.last_mut() {
            last.end_time = Some(elapsed);
            last.impact_segment = Some(segment);
        }

        let mut next = current;
        next.reanchor(response.velocity, dt);
        log::debug!(
            "Bounce at t={:.3} x={:.2} on segment {} -> v=({:.2}, {:.2})",
            elapsed,
            impact_x,
            segment,
            response.velocity.x,
            response.velocity.y
        );

        let mut arc = FlightArc::open(next, elapsed);
        if response.is_at_rest() {
            arc.end_time = Some(elapsed);
            arcs.push(arc);
            break ChainStatus::WaitingForStrike;
        }
        arcs.push(arc);
        current = next;
    };

    log::info!(
        "Planned bounce chain: {} arcs, status {:?}, last impact at {:?}",
        arcs.len(),
        status,
        arcs.iter().rev().find_map(|a| a.end_time)
    );

    BounceChain { arcs, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::G;
    use crate::sim::segment::Segment;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn flat(height: f64, width: f64) -> Sector {
        Sector::from_segments(vec![Segment::line(0.0, 0.0, width, height)])
    }

    fn precise() -> PhysicsConfig {
        PhysicsConfig {
            height_precision: 1e-3,
            ..Default::default()
        }
    }

    #[test]
    fn test_flat_scenario_first_bounce() {
        let sector = flat(0.0, 10_000.0);
        let ball = Ball::anchored(DVec2::new(0.0, 100.0), DVec2::new(10.0, 0.0), G);
        let physics = precise();
        let chain = plan_trajectory(&ball, &sector, &physics, &PlannerLimits::default());

        let first = chain.arcs[0];
        let end = first.end_time.unwrap();
        assert!((end - (200.0 / 9.8_f64).sqrt()).abs() < 1e-3);
        assert!((first.ball.x_at(end) - 45.18).abs() < 0.01);

        let impact_vy = first.ball.vy_at(end);
        let second = chain.arcs[1];
        assert_eq!(second.start_time, end);
        let rebound = second.ball.initial_velocity();
        assert!(rebound.y > 0.0);
        assert!((rebound.y - (-impact_vy) * physics.restitution).abs() < 1e-9);
        assert!((rebound.x - (10.0 * physics.restitution - physics.kinetic_friction)).abs() < 1e-9);
    }

    #[test]
    fn test_damping_terrain_comes_to_rest() {
        let sector = flat(0.0, 10_000.0);
        let ball = Ball::anchored(DVec2::new(100.0, 200.0), DVec2::new(15.0, 5.0), G);
        let chain = plan_trajectory(&ball, &sector, &precise(), &PlannerLimits::default());

        assert_eq!(chain.status, ChainStatus::WaitingForStrike);
        assert!(chain.arcs.len() < 64);
        let last = chain.arcs.last().unwrap();
        assert!(last.is_resting());
        assert!(chain.is_settled_at(last.start_time));
        assert_eq!(chain.velocity_at(last.start_time + 10.0), Some(DVec2::ZERO));
    }

    #[test]
    fn test_drop_outside_sector_is_impossible() {
        let sector = flat(0.0, 100.0);
        let ball = Ball::new(500.0, 50.0);
        let chain = plan_trajectory(&ball, &sector, &precise(), &PlannerLimits::default());

        assert_eq!(chain.status, ChainStatus::Impossible);
        assert_eq!(chain.arcs.len(), 1);
        assert_eq!(chain.arcs[0].end_time, None);
        assert_eq!(chain.duration(), None);
    }

    #[test]
    fn test_fast_ball_leaves_playfield() {
        let sector = flat(0.0, 200.0);
        let ball = Ball::anchored(DVec2::new(10.0, 50.0), DVec2::new(150.0, 20.0), G);
        let chain = plan_trajectory(&ball, &sector, &precise(), &PlannerLimits::default());
        assert_eq!(chain.status, ChainStatus::Impossible);
        assert!(chain.arcs.last().unwrap().end_time.is_none());
    }

    #[test]
    fn test_limits_truncate_runaway_chain() {
        // Lossless bounces never settle
        let physics = PhysicsConfig {
            restitution: 1.0,
            kinetic_friction: 0.0,
            min_vertical_velocity: 0.0,
            height_precision: 1e-3,
            ..Default::default()
        };
        let limits = PlannerLimits {
            max_arcs: 8,
            ..Default::default()
        };
        let sector = flat(0.0, 100.0);
        let ball = Ball::new(50.0, 20.0);
        let chain = plan_trajectory(&ball, &sector, &physics, &limits);

        assert_eq!(chain.status, ChainStatus::Truncated);
        assert_eq!(chain.arcs.len(), 8);
    }

    #[test]
    fn test_impacts_and_replay() {
        let sector = flat(0.0, 10_000.0);
        let ball = Ball::anchored(DVec2::new(0.0, 100.0), DVec2::new(10.0, 0.0), G);
        let chain = plan_trajectory(&ball, &sector, &precise(), &PlannerLimits::default());

        let impacts = chain.impacts();
        assert!(!impacts.is_empty());
        for pair in impacts.windows(2) {
            assert!(pair[1].time >= pair[0].time);
        }
        let first = impacts[0];
        assert!(first.position.y >= 0.0 && first.position.y < 1e-3);
        let replayed = chain.position_at(first.time).unwrap();
        assert!((replayed - first.position).length() < 1e-6);
        assert_eq!(chain.position_at(0.0), Some(DVec2::new(0.0, 100.0)));
    }

    #[test]
    fn test_arc_at_before_start_uses_first_arc() {
        let sector = flat(0.0, 1000.0);
        let ball = Ball::new(10.0, 10.0);
        let chain = plan_trajectory(&ball, &sector, &precise(), &PlannerLimits::default());
        assert_eq!(chain.arc_at(-5.0), chain.arcs.first());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_chain_arcs_are_continuous(
            seed in any::<u64>(),
            vx in -60.0..60.0_f64,
            vy in -10.0..40.0_f64,
        ) {
            let settings = crate::Settings::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let sector = crate::sim::generate_sector(&settings.terrain, &mut rng);
            let ball = Ball::anchored(
                DVec2::new(settings.terrain.min_segment_width, settings.terrain.max_height),
                DVec2::new(vx, vy),
                settings.physics.gravity,
            );
            let chain = plan_trajectory(&ball, &sector, &settings.physics, &settings.planner);

            prop_assert!(!chain.arcs.is_empty());
            prop_assert!(chain.arcs.len() <= settings.planner.max_arcs);
            for pair in chain.arcs.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let end = a.end_time.unwrap();
                prop_assert_eq!(b.start_time, end);
                let joint = a.ball.position_at(end - a.start_time);
                prop_assert!((joint - b.ball.initial_position()).length() < 1e-6);
                prop_assert!(b.start_time >= a.start_time);
            }
        }

        #[test]
        fn prop_rolling_flight_stays_above_terrain(
            seed in any::<u64>(),
            vx in -80.0..80.0_f64,
            vy in -10.0..40.0_f64,
        ) {
            let mut settings = crate::Settings::from_style(crate::settings::SectorStyle::Rolling);
            settings.terrain.flat_probability = 0.7;
            settings.terrain.hump_probability = 1.0;
            let mut rng = Pcg32::seed_from_u64(seed);
            let sector = crate::sim::generate_sector(&settings.terrain, &mut rng);
            let ball = Ball::anchored(
                DVec2::new(settings.terrain.min_segment_width, settings.terrain.max_height),
                DVec2::new(vx, vy),
                settings.physics.gravity,
            );
            let chain = plan_trajectory(&ball, &sector, &settings.physics, &settings.planner);

            for arc in chain.arcs.iter().filter(|a| !a.is_resting()) {
                let Some(end) = arc.end_time else { continue };
                let span = end - arc.start_time;
                for i in 0..=64 {
                    let p = arc.ball.position_at(span * i as f64 / 64.0);
                    if let Some(ground) = sector.height_at(p.x) {
                        prop_assert!(
                            p.y > ground - 1.0,
                            "arc at t={} dips to {} under ground {} at x={}",
                            arc.start_time, p.y, ground, p.x
                        );
                    }
                }
            }
        }
    }
}
